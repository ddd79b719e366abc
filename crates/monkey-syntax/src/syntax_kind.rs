/// Token and node kinds for the Monkey grammar.
///
/// Terminal kinds come first so that `kind as u16` doubles as a dense
/// index into per-state action rows; `EOF` is the last terminal.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SyntaxKind {
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    COMMA,
    SEMICOLON,
    COLON,

    EQ,
    PLUS,
    MINUS,
    BANG,
    STAR,
    SLASH,
    LT,
    GT,
    EQ_EQ,
    NOT_EQ,

    FN_KW,
    LET_KW,
    TRUE_KW,
    FALSE_KW,
    IF_KW,
    ELSE_KW,
    RETURN_KW,

    IDENT,
    INT,
    STRING,

    ERROR_TOKEN,
    EOF,

    PROGRAM,
    LET_STMT,
    RETURN_STMT,
    EXPR_STMT,
    BLOCK,
    PREFIX_EXPR,
    INFIX_EXPR,
    PAREN_EXPR,
    CALL_EXPR,
    INDEX_EXPR,
    IF_EXPR,
    FN_LITERAL,
    ARRAY_LITERAL,
    HASH_LITERAL,
    HASH_PAIR,
    ERROR,
}

impl SyntaxKind {
    pub const TERMINAL_COUNT: usize = Self::EOF as usize + 1;

    /// All terminals, indexed by discriminant.
    pub const TERMINALS: [Self; Self::TERMINAL_COUNT] = [
        Self::L_PAREN,
        Self::R_PAREN,
        Self::L_BRACKET,
        Self::R_BRACKET,
        Self::L_BRACE,
        Self::R_BRACE,
        Self::COMMA,
        Self::SEMICOLON,
        Self::COLON,
        Self::EQ,
        Self::PLUS,
        Self::MINUS,
        Self::BANG,
        Self::STAR,
        Self::SLASH,
        Self::LT,
        Self::GT,
        Self::EQ_EQ,
        Self::NOT_EQ,
        Self::FN_KW,
        Self::LET_KW,
        Self::TRUE_KW,
        Self::FALSE_KW,
        Self::IF_KW,
        Self::ELSE_KW,
        Self::RETURN_KW,
        Self::IDENT,
        Self::INT,
        Self::STRING,
        Self::ERROR_TOKEN,
        Self::EOF,
    ];

    pub const fn is_terminal(self) -> bool {
        (self as usize) < Self::TERMINAL_COUNT
    }

    /// Reserved-word table, defined once.
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "fn" => Self::FN_KW,
            "let" => Self::LET_KW,
            "true" => Self::TRUE_KW,
            "false" => Self::FALSE_KW,
            "if" => Self::IF_KW,
            "else" => Self::ELSE_KW,
            "return" => Self::RETURN_KW,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable name used in diagnostics and grammar errors.
    pub fn describe(self) -> &'static str {
        match self {
            Self::L_PAREN => "'('",
            Self::R_PAREN => "')'",
            Self::L_BRACKET => "'['",
            Self::R_BRACKET => "']'",
            Self::L_BRACE => "'{'",
            Self::R_BRACE => "'}'",
            Self::COMMA => "','",
            Self::SEMICOLON => "';'",
            Self::COLON => "':'",
            Self::EQ => "'='",
            Self::PLUS => "'+'",
            Self::MINUS => "'-'",
            Self::BANG => "'!'",
            Self::STAR => "'*'",
            Self::SLASH => "'/'",
            Self::LT => "'<'",
            Self::GT => "'>'",
            Self::EQ_EQ => "'=='",
            Self::NOT_EQ => "'!='",
            Self::FN_KW => "'fn'",
            Self::LET_KW => "'let'",
            Self::TRUE_KW => "'true'",
            Self::FALSE_KW => "'false'",
            Self::IF_KW => "'if'",
            Self::ELSE_KW => "'else'",
            Self::RETURN_KW => "'return'",
            Self::IDENT => "identifier",
            Self::INT => "integer literal",
            Self::STRING => "string literal",
            Self::ERROR_TOKEN => "unrecognized token",
            Self::EOF => "end of file",
            Self::PROGRAM => "program",
            Self::LET_STMT => "let statement",
            Self::RETURN_STMT => "return statement",
            Self::EXPR_STMT => "expression statement",
            Self::BLOCK => "block",
            Self::PREFIX_EXPR => "prefix expression",
            Self::INFIX_EXPR => "infix expression",
            Self::PAREN_EXPR => "grouped expression",
            Self::CALL_EXPR => "call expression",
            Self::INDEX_EXPR => "index expression",
            Self::IF_EXPR => "if expression",
            Self::FN_LITERAL => "function literal",
            Self::ARRAY_LITERAL => "array literal",
            Self::HASH_LITERAL => "hash literal",
            Self::HASH_PAIR => "hash pair",
            Self::ERROR => "error",
        }
    }
}
