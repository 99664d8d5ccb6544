//! letterforge – command-line JSON → PDF letter generator.
//!
//! Usage:
//!   letterforge <input.json> [output.pdf] [--lenient] [--title "Rechnung"]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file
//! with the same stem (e.g. `invoice.json` → `invoice.pdf`). The input is a
//! letter content document; `--sample invoice|delivery|attachment` prints a
//! ready-made example to stdout.

use std::{env, fs, path::PathBuf, process};

use letter_forge::{templates, ErrorMode, GeneratorConfig, Letter, LetterContent};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut lenient = false;
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lenient" | "-l" => lenient = true,
            "--title" | "-t" => match iter.next() {
                Some(v) => title = Some(v.clone()),
                None => {
                    eprintln!("--title needs a value");
                    process::exit(1);
                }
            },
            "--sample" | "-s" => {
                let which = iter.next().map(String::as_str).unwrap_or("invoice");
                let json = match which {
                    "invoice" => templates::invoice_template(),
                    "delivery" => templates::delivery_note_template(),
                    "attachment" => templates::table_attachment_template(),
                    other => {
                        eprintln!("Unknown sample {other:?} (invoice, delivery, attachment)");
                        process::exit(1);
                    }
                };
                println!("{json}");
                process::exit(0);
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Default output: same directory + same stem as input, but with .pdf
    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let content = match LetterContent::from_json(&json) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    };

    // Default title: stem of the input filename.
    let default_title = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("letter-forge output")
        .to_string();

    let letter = Letter {
        config: GeneratorConfig {
            title: title.unwrap_or(default_title),
            error_mode: if lenient {
                ErrorMode::Lenient
            } else {
                ErrorMode::Strict
            },
            ..GeneratorConfig::din_5008_a()
        },
        content,
    };

    match letter.render() {
        Ok(rendered) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &rendered.bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                rendered.bytes.len(),
                rendered.pages,
                if rendered.pages == 1 { "" } else { "s" }
            );
            if let Some(e) = rendered.error {
                eprintln!("Layout error: {e}");
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("letterforge – DIN 5008 letter to PDF generator (letter-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.json> [output.pdf] [--lenient] [--title \"Rechnung\"]");
    eprintln!("  {prog} --sample invoice|delivery|attachment");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input.json>   Letter content (logos must be http(s) URLs or data URIs)");
    eprintln!("  [output.pdf]   Output path  (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t    Document title in PDF metadata (default: input filename stem)");
    eprintln!("  --lenient      Keep rendering after layout errors (last error wins)");
    eprintln!("  --sample, -s   Print a sample letter JSON and exit");
    eprintln!("  --help         Print this message");
}
