use std::{env, fs::read_to_string, path::Path, process, rc::Rc, time::Instant};

use typeck::{
    display_error, errors::errors::Error, lexer::lexer::tokenize, parser::parser::parse, scope::binder::bind,
    type_checker::type_checker::type_check,
};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("usage: typeck <file>");
        process::exit(2);
    }

    let file_path: &str = &args[1];
    let file_name = Path::new(file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string());

    let source = match read_to_string(file_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file_path, error);
            process::exit(2);
        }
    };

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => fail(&[error], &source, &file_name),
    };

    println!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let mut ast = match parse(tokens, Rc::new(file_name.clone())) {
        Ok(ast) => ast,
        Err(error) => fail(&[error], &source, &file_name),
    };

    println!("Parsed {} nodes in {:?}", ast.len(), parse_start.elapsed());

    let bind_start = Instant::now();
    let scopes = match bind(&mut ast) {
        Ok(scopes) => scopes,
        Err(errors) => fail(&errors, &source, &file_name),
    };

    println!("Bound {} scopes in {:?}", scopes.len(), bind_start.elapsed());

    let type_check_start = Instant::now();
    if let Err(errors) = type_check(&mut ast, &scopes) {
        fail(&errors, &source, &file_name);
    }

    println!("Type checked in {:?}", type_check_start.elapsed());
    println!("Total time: {:?}", start.elapsed());
}

fn fail(errors: &[Error], source: &str, file_name: &str) -> ! {
    for error in errors {
        display_error(error, source, file_name);
    }

    process::exit(1);
}
