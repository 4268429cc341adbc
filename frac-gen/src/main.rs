mod error;
mod methods;
mod template;

use error::Error;
use frac_expr::{generate_retrying, Expr, GenOptions};
use frac_session::{SessionHeader, SessionReader, SessionRecord, SessionWriter};
use methods::{Method, DEFAULT_METHOD, NORMS};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    process::ExitCode,
    time::{SystemTime, UNIX_EPOCH},
};

const USAGE: &str = "\
usage: frac-gen [options] <session-file>

With a fresh or header-only session file, generates expressions and appends them to the
session; with a session that already holds expressions, replays those records instead.

options:
    --seed <n>        seed for the random source (default: current unix time)
    --count <n>       expressions to generate before stopping (default: 1)
    --ternary         allow ternary conditionals in generated expressions
    --method <name>   root-finding method recorded in the session (default: Newton)
    --norm <name>     norm recorded in the session (default: norm2)
    --template <file> renderer source template to splice expressions into
    --out <dir>       directory for generated sources and seed provenance (default: .)";

struct Options {
    session: PathBuf,
    out_dir: PathBuf,
    template: Option<PathBuf>,
    method: &'static Method,
    norm: String,
    seed: Option<u64>,
    count: u64,
    ternary: bool,
}

fn next_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, Error> {
    args.next().ok_or_else(|| Error::Usage(format!("`{flag}` expects a value\n\n{USAGE}")))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, Error> {
    let mut session = None;
    let mut out_dir = PathBuf::from(".");
    let mut template = None;
    let mut method = DEFAULT_METHOD;
    let mut norm = "norm2".to_string();
    let mut seed = None;
    let mut count = 1;
    let mut ternary = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = next_value(&mut args, "--seed")?;
                seed = Some(value.parse().map_err(|_| {
                    Error::Usage(format!("`--seed` expects an integer, got `{value}`"))
                })?);
            },
            "--count" => {
                let value = next_value(&mut args, "--count")?;
                count = value.parse().map_err(|_| {
                    Error::Usage(format!("`--count` expects an integer, got `{value}`"))
                })?;
            },
            "--ternary" => ternary = true,
            "--method" => {
                let name = next_value(&mut args, "--method")?;
                method = Method::find(&name)
                    .ok_or_else(|| Error::Usage(format!("unknown method `{name}`")))?;
            },
            "--norm" => {
                let name = next_value(&mut args, "--norm")?;
                if !NORMS.contains(&name.as_str()) {
                    return Err(Error::Usage(format!("unknown norm `{name}`")));
                }
                norm = name;
            },
            "--template" => template = Some(PathBuf::from(next_value(&mut args, "--template")?)),
            "--out" => out_dir = PathBuf::from(next_value(&mut args, "--out")?),
            _ if arg.starts_with("--") => {
                return Err(Error::Usage(format!("unknown option `{arg}`\n\n{USAGE}")));
            },
            _ => {
                if session.replace(PathBuf::from(&arg)).is_some() {
                    return Err(Error::Usage(format!("unexpected argument `{arg}`\n\n{USAGE}")));
                }
            },
        }
    }

    let session = session.ok_or_else(|| Error::Usage(USAGE.to_string()))?;
    Ok(Options { session, out_dir, template, method, norm, seed, count, ternary })
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn session_error(opts: &Options, src: &str, err: frac_error::Error) -> Error {
    Error::Session {
        err,
        path: opts.session.display().to_string(),
        src: src.to_string(),
    }
}

fn read_template(opts: &Options) -> Result<Option<String>, Error> {
    opts.template
        .as_ref()
        .map(fs::read_to_string)
        .transpose()
        .map_err(Into::into)
}

/// Splices one (expression, derivative) pair into the renderer source template and writes the
/// produced translation unit. Building and running it is out of scope here.
fn write_renderer_source(
    opts: &Options,
    template_src: &str,
    method_arg: &str,
    num: u64,
    expr: &str,
    diff_expr: &str,
) -> Result<(), Error> {
    let source = template::substitute(template_src, &[
        ("expr", expr),
        ("expr_diff", diff_expr),
        ("method", method_arg),
    ]);
    fs::write(opts.out_dir.join(format!("FracMath{num}.cpp")), source)?;
    Ok(())
}

/// Generates expressions, appending each to the session as it is produced. When `header` is
/// given, the session file already holds a valid (expression-free) header and generation
/// continues under its parameters.
fn generate_session(opts: &Options, header: Option<SessionHeader>) -> Result<(), Error> {
    let fresh = header.is_none();
    let header = header.unwrap_or_else(|| SessionHeader {
        method: opts.method.name.to_string(),
        method_params: opts.method.params.to_string(),
        norm: opts.norm.clone(),
        ..SessionHeader::default()
    });

    // The header's method decides whether derivatives are produced at all; differentiating for
    // a method that never reads the result is a contract violation, not a convenience.
    let needs_derivative = Method::find(&header.method)
        .map(|method| method.needs_derivative)
        .unwrap_or(false);
    if needs_derivative && opts.ternary {
        return Err(Error::Usage(format!(
            "the `{}` method needs a derivative; ternary conditionals are not differentiable",
            header.method,
        )));
    }

    let seed = opts.seed.unwrap_or_else(clock_seed);
    fs::create_dir_all(&opts.out_dir)?;
    fs::write(opts.out_dir.join("last_seed.txt"), format!("Seed: {seed}\n"))?;

    let file = OpenOptions::new().create(true).append(true).open(&opts.session)?;
    let mut writer = SessionWriter::new(file);
    if fresh {
        writer.write_header(&header)?;
    }

    let template_src = read_template(opts)?;
    let method_arg = format!("{}{}", header.method, header.method_params);
    let gen_opts = GenOptions::default().ternary(opts.ternary);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut remaining = opts.count;
    let mut stop_requested = move || {
        if remaining == 0 {
            return true;
        }
        remaining -= 1;
        false
    };

    let mut num = 0;
    // The stop check runs once per cycle; a cycle always completes once started.
    while !stop_requested() {
        let expr = Expr::new(generate_retrying(&mut rng, &gen_opts));
        let diff_text = if needs_derivative {
            expr.differentiate()
                .expect("trees generated without ternaries are differentiable")
                .text()
                .to_string()
        } else {
            String::new()
        };

        writer.write_record(num, expr.text(), &diff_text)?;
        writer.flush()?;

        if let Some(template_src) = &template_src {
            write_renderer_source(opts, template_src, &method_arg, num, expr.text(), &diff_text)?;
        }

        eprintln!("expression {num}: {}", expr.text());
        num += 1;
    }
    Ok(())
}

/// Replays previously persisted records, bypassing generation and differentiation entirely.
fn replay_session(
    opts: &Options,
    header: &SessionHeader,
    records: &[SessionRecord],
) -> Result<(), Error> {
    let template_src = read_template(opts)?;
    let method_arg = format!("{}{}", header.method, header.method_params);

    fs::create_dir_all(&opts.out_dir)?;
    for record in records {
        if let Some(template_src) = &template_src {
            write_renderer_source(
                opts,
                template_src,
                &method_arg,
                record.num,
                &record.expr,
                &record.diff_expr,
            )?;
        }
        eprintln!("replayed expression {}", record.num);
    }
    Ok(())
}

fn run(opts: &Options) -> Result<(), Error> {
    let existing = match fs::read_to_string(&opts.session) {
        Ok(src) => src,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err.into()),
    };

    if existing.trim().is_empty() {
        return generate_session(opts, None);
    }

    let mut reader = SessionReader::new(&existing);
    let header = reader
        .read_header()
        .map_err(|err| session_error(opts, &existing, err))?;
    let records = reader
        .read_records()
        .map_err(|err| session_error(opts, &existing, err))?;

    if records.is_empty() {
        // A valid header with no expressions yet: keep generating under its parameters.
        generate_session(opts, Some(header))
    } else {
        replay_session(opts, &header, &records)
    }
}

fn main() -> ExitCode {
    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            err.report_to_stderr();
            return ExitCode::FAILURE;
        },
    };

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.report_to_stderr();
            ExitCode::FAILURE
        },
    }
}
