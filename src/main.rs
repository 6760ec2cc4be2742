use std::{env::args, path::Path};

use pretty_env_logger::formatted_builder;
use sequitur::{
    kb::KnowledgeBase,
    parser::{self, parse_file},
    prelude::*,
    report::Report,
    sentence::{self, Sentence},
};

fn usage_string() -> String {
    format!(
        "Usage: {} <command>

command:
    sat <file_name> - check the knowledge base for satisfiability
    entails <file_name> <query> - check whether the knowledge base entails the query
    table <file_name> <query> - entailment status of the query by truth table
    cnf <file_name> - print the knowledge base in conjunctive normal form",
        args().next().unwrap()
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Failed to parse the knowledge base"))]
    ParserError { source: parser::Error },
    #[snafu(display("Failed to parse the query"))]
    QueryError { source: sentence::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

fn load_base(path: &Path) -> Result<KnowledgeBase, Error> {
    let mut base = KnowledgeBase::new();
    for sentence in parse_file(path).context(ParserError)? {
        base.add(sentence);
    }
    Ok(base)
}

fn parse_query(text: &str) -> Result<Sentence, Error> {
    Sentence::parse(text).context(QueryError)
}

fn dispatch_command(args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("sat") => {
            let path = args.get(1).context(MissingArgument)?;
            let base = load_base(path.as_ref())?;
            if base.dpll_is_satisfiable() {
                println!("SAT");
            } else {
                println!("UNSAT");
            }
        }
        Some("entails") => {
            let path = args.get(1).context(MissingArgument)?;
            let query = args.get(2).context(MissingArgument)?;
            let base = load_base(path.as_ref())?;
            let query = parse_query(query)?;
            if base.dpll_entails(&query) {
                println!("YES");
            } else {
                println!("NO");
            }
        }
        Some("table") => {
            let path = args.get(1).context(MissingArgument)?;
            let query = args.get(2).context(MissingArgument)?;
            let base = load_base(path.as_ref())?;
            let query = parse_query(query)?;
            println!("{}", base.truth_table_entails(&query));
        }
        Some("cnf") => {
            let path = args.get(1).context(MissingArgument)?;
            let base = load_base(path.as_ref())?.to_cnf_clone();
            println!("{}", base);
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => MissingArgument.fail()?,
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        if cfg!(debug_assertions) {
            builder.parse_filters("sequitur=debug");
        } else {
            builder.parse_filters("sequitur=warn");
        }
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let mut args = args();

    // drop arg[0]
    args.next();

    let remaining: Vec<_> = args.collect();

    if remaining.is_empty() {
        println!("{}", usage_string());
    } else {
        dispatch_command(remaining)?;
    }

    Ok(())
}
