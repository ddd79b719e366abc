use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use monkey_errors::Renderer;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
enum Options {
    /// Parse a file and print its syntax tree.
    Parse { path: Utf8PathBuf },
    /// Parse a file and report diagnostics.
    Check { path: Utf8PathBuf },
}

fn main() -> anyhow::Result<()> {
    match Options::parse() {
        Options::Parse { path } => {
            let text = read(&path)?;
            let file = monkey_parser::parse(&text);
            print!("{}", file.tree().dump());

            let renderer = Renderer::styled();
            for diagnostic in file.errors() {
                eprintln!("{}", diagnostic.render(&renderer, path.as_str(), &text));
            }
            Ok(())
        }
        Options::Check { path } => {
            let text = read(&path)?;
            let file = monkey_parser::parse(&text);

            let renderer = Renderer::styled();
            let index = file.line_index();
            for diagnostic in file.errors() {
                let position = index.line_col(diagnostic.range().start());
                eprintln!(
                    "{path}:{}:{}: {}",
                    position.line + 1,
                    position.col + 1,
                    diagnostic.message()
                );
                eprintln!("{}", diagnostic.render(&renderer, path.as_str(), &text));
            }

            if file.errors().is_empty() { Ok(()) } else { std::process::exit(1) }
        }
    }
}

fn read(path: &Utf8PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
}
