use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use petgraph::dot::{Config, Dot};

use quadc::lexer;
use quadc::parser::generator::LrGenerator;
use quadc::parser::grammar::Grammar;
use quadc::parser::Parser;
use quadc::tac::{render_listing, TacGen};

/// Source-to-TAC translator for a small block-structured language.
#[derive(ClapParser)]
#[command(version, about)]
struct Cli {
    /// Source file to translate.
    input: PathBuf,

    /// Print the token stream before parsing.
    #[arg(long)]
    tokens: bool,

    /// Print every shift/reduce step of the parse.
    #[arg(long)]
    trace_parse: bool,

    /// Print the AST root after a successful parse.
    #[arg(long)]
    ast: bool,

    /// Print the LR(1) automaton as Graphviz dot and exit.
    #[arg(long)]
    dot_automaton: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let generator = LrGenerator::new(Grammar::object_language());
    if cli.dot_automaton {
        let graph = generator.automaton_graph();
        println!("{:?}", Dot::with_config(&graph, &[Config::GraphContentOnly]));
        return Ok(ExitCode::SUCCESS);
    }

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    let tokens = lexer::tokenize(&source);

    if cli.tokens {
        for token in &tokens {
            println!(
                "{:>4}:{:<3} {:?} `{}`",
                token.line, token.col, token.kind, token.lexeme
            );
        }
    }

    let table = generator.build_table()?;
    for conflict in table.conflicts() {
        eprintln!("{conflict}");
    }

    let mut parser = Parser::new(generator.into_grammar(), table);
    parser.set_trace(cli.trace_parse);

    let program = match parser.parse(&tokens) {
        Ok(program) => program,
        Err(err) => {
            for syntax_error in parser.syntax_errors() {
                eprintln!("{syntax_error}");
            }
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    for syntax_error in parser.syntax_errors() {
        eprintln!("{syntax_error}");
    }

    if cli.ast {
        println!("{program:#?}");
    }

    let mut gen = TacGen::new();
    gen.lower_program(&program);

    print!("{}", render_listing(gen.instructions()));
    for error in gen.errors() {
        eprintln!("{error}");
    }
    for warning in gen.symtab().warnings() {
        eprintln!("warning: {warning}");
    }
    print!("{}", gen.symtab_mut().dump());

    Ok(ExitCode::SUCCESS)
}
