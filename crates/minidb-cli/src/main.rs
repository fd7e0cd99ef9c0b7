use std::ffi::OsString;
use std::io::{self, BufRead, ErrorKind, Write};

use minidb_lexer::{Lexer, Token, TokenKind};

const PROMPT: &str = "minidb> ";
const EXIT_WORD: &str = "exit";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    command: Option<String>,
    show_help: bool,
}

fn main() {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut input, &mut stdout, &mut stderr);
    drop(input);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, R, W, E>(args: I, input: &mut R, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = write_usage(err);
            return 2;
        }
    };

    if options.show_help {
        if write_usage(out).is_err() {
            return 1;
        }
        return 0;
    }

    if let Some(command) = options.command {
        if write_tokens(&command, out).is_err() {
            let _ = writeln!(err, "error: failed writing tokens");
            return 1;
        }
        return 0;
    }

    run_repl(input, out, err)
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();

    let mut command: Option<String> = None;
    let mut show_help = false;

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy();
        let arg_str = arg.as_ref();

        match arg_str {
            "-h" | "--help" => {
                show_help = true;
            }
            "-c" | "--command" => {
                if command.is_some() {
                    return Err(String::from("`-c/--command` may only be provided once"));
                }
                let next = iter
                    .next()
                    .ok_or_else(|| String::from("missing statement argument for `-c/--command`"))?;
                command = Some(next.to_string_lossy().into_owned());
            }
            _ => {
                if let Some(value) = arg_str
                    .strip_prefix("-c=")
                    .or_else(|| arg_str.strip_prefix("--command="))
                {
                    if command.is_some() {
                        return Err(String::from("`-c/--command` may only be provided once"));
                    }
                    command = Some(value.to_owned());
                    continue;
                }

                if arg_str.starts_with('-') {
                    return Err(format!("unknown option `{arg_str}`"));
                }

                return Err(format!("unexpected positional argument `{arg_str}`"));
            }
        }
    }

    Ok(CliOptions { command, show_help })
}

fn run_repl<R, W, E>(input: &mut R, out: &mut W, err: &mut E) -> i32
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut line_buffer = String::new();

    loop {
        if write!(out, "{PROMPT}").and_then(|()| out.flush()).is_err() {
            return 1;
        }

        line_buffer.clear();
        let bytes_read = match input.read_line(&mut line_buffer) {
            Ok(bytes_read) => bytes_read,
            Err(error) if error.kind() == ErrorKind::Interrupted => {
                // Keep the shell alive on Ctrl-C style interrupts.
                let _ = writeln!(out);
                continue;
            }
            Err(error) => {
                let _ = writeln!(err, "error: {error}");
                return 1;
            }
        };

        if bytes_read == 0 {
            return 0;
        }

        let line = line_buffer.trim();

        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case(EXIT_WORD) {
            return 0;
        }

        if write_tokens(line, out).is_err() {
            let _ = writeln!(err, "error: failed writing tokens");
            return 1;
        }
    }
}

/// Print one `<tag> <literal>` row per token. The end-of-input token
/// terminates collection and is not printed.
fn write_tokens<W>(source: &str, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    for token in collect_tokens(source) {
        writeln!(out, "{}", format_token(&token))?;
    }
    Ok(())
}

fn collect_tokens(source: &str) -> Vec<Token> {
    Lexer::new(source)
        .take_while(|token| token.kind != TokenKind::Eof)
        .collect()
}

fn format_token(token: &Token) -> String {
    format!("{:<8} {}", token.kind.tag(), token.literal)
}

fn write_usage<W>(out: &mut W) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "Usage: minidb [-c|--command SQL]\n\
         \n\
         Reads one SQL-like statement per line and prints its token stream.\n\
         Type `exit` to leave the shell.\n\
         \n\
         Examples:\n\
         \n\
         minidb\n\
         minidb -c \"SELECT * FROM users;\"\n",
    )
}
