use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use furigana::{
    FixedAdvanceMeasurer, FuriganaDocument, FuriganaView, LayoutConstraints, MeasureSpec,
};

#[derive(Clone, Debug)]
struct Args {
    doc_path: String,
    width: Option<i32>,
    height: Option<i32>,
    exact: bool,
    pretty: bool,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cfg = parse_args(args)?;
    let json = std::fs::read_to_string(&cfg.doc_path)
        .map_err(|e| format!("unable to read {}: {}", cfg.doc_path, e))?;
    let doc = FuriganaDocument::from_json_str(&json).map_err(|e| e.to_string())?;

    let mut view = FuriganaView::new(doc.config, Arc::new(FixedAdvanceMeasurer::default()));
    view.set_source_text(doc.text);
    view.set_annotation_set(doc.annotations);

    let spec = |value: Option<i32>| match (value, cfg.exact) {
        (Some(px), true) => MeasureSpec::Exact(px),
        (Some(px), false) => MeasureSpec::AtMost(px),
        (None, _) => MeasureSpec::Unconstrained,
    };
    let (width, height) = view.measure(LayoutConstraints::new(spec(cfg.width), spec(cfg.height)));

    let out = serde_json::json!({
        "width": width,
        "height": height,
        "lines": view.wrapped_lines().as_slice(),
        "commands": view.draw_commands(),
    });
    let rendered = if cfg.pretty {
        serde_json::to_string_pretty(&out)
    } else {
        serde_json::to_string(&out)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", rendered);
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        doc_path: args[1].clone(),
        width: None,
        height: None,
        exact: false,
        pretty: false,
    };

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.width = Some(
                    v.parse::<i32>()
                        .map_err(|_| format!("invalid --width value '{}'", v))?,
                );
                i += 2;
            }
            "--height" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--height requires a value".to_string())?;
                cfg.height = Some(
                    v.parse::<i32>()
                        .map_err(|_| format!("invalid --height value '{}'", v))?,
                );
                i += 2;
            }
            "--exact" => {
                cfg.exact = true;
                i += 1;
            }
            "--pretty" => {
                cfg.pretty = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    if cfg.width.is_some_and(|w| w <= 0) || cfg.height.is_some_and(|h| h <= 0) {
        return Err("--width and --height must be > 0".to_string());
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    "usage: furigana <document.json> [--width PX] [--height PX] [--exact] [--pretty]\n\
     \n\
     Lays out a furigana document with a fixed-advance measurer and prints the\n\
     measured size, wrapped lines and draw commands as JSON.\n\
     Bounds are advisory unless --exact is given."
}
