//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use dataklass_core::MethodFamily;
use dataklass_core::lang::magic_methods::{self, MagicMethodId};

use crate::codegen::{self, compile_def};
use crate::runtime::{Class, ClassAttr, ClassBuilder, RuntimeError, Value, protocol};
use crate::synth::{FieldList, SynthConfig, SynthError, Synthesizer, TemplateRegistry, specialize};
use crate::template::{TemplateError, lexer, parser};

use super::{CliError, CliResult, ExitCode};

// ============================================================================
// Error rendering
// ============================================================================

fn render_template_errors(name: &str, source: &str, errors: &[TemplateError]) -> CliError {
    let rendered: Vec<String> = errors
        .iter()
        .map(|err| format!("{:?}", miette::Report::new(err.to_report(name, source))))
        .collect();
    CliError::failure(rendered.join("\n").trim_end().to_string())
}

fn synth_failure(err: SynthError) -> CliError {
    match err {
        SynthError::TemplateCompile {
            family,
            arity,
            ref source,
        } => {
            let text = codegen::generate(family, arity);
            let label = format!("<{}/{}>", family, arity);
            let rendered = render_template_errors(&label, &text, std::slice::from_ref(source));
            CliError::failure(format!("{}\n{}", err, rendered.message))
        }
        other => CliError::failure(other.to_string()),
    }
}

fn runtime_failure(err: RuntimeError) -> CliError {
    CliError::failure(format!("runtime error: {}", err))
}

// ============================================================================
// Template inspection
// ============================================================================

/// Print the template source the generator produces for `family` at `arity`.
pub fn print_template(family: MethodFamily, arity: usize) -> CliResult<ExitCode> {
    print!("{}", codegen::generate(family, arity));
    Ok(ExitCode::SUCCESS)
}

/// Print the code object for `family` specialized to `fields`.
///
/// With `template_only`, print the cached template itself (placeholders in the name tables).
pub fn disassemble(family: MethodFamily, fields: &[String], template_only: bool) -> CliResult<ExitCode> {
    let fields = FieldList::try_from_names(fields).map_err(synth_failure)?;
    let registry = TemplateRegistry::new();
    let template = registry.get_or_compile(family, fields.arity()).map_err(synth_failure)?;

    if template_only {
        println!("{}", template.code().disassemble());
    } else {
        let function = specialize(&template, &fields);
        println!("{}", function.code.disassemble());
    }
    Ok(ExitCode::SUCCESS)
}

/// Lex, parse, and compile a template-language file.
pub fn compile_file(path: &Path, show_tokens: bool, show_ast: bool) -> CliResult<ExitCode> {
    let source = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))?;
    let name = path.display().to_string();

    let tokens = lexer::lex(&source).map_err(|errors| render_template_errors(&name, &source, &errors))?;
    if show_tokens {
        println!("=== Tokens ===");
        for token in &tokens {
            println!("{:?}", token);
        }
        println!();
    }

    let def = parser::parse(&tokens).map_err(|e| render_template_errors(&name, &source, &[e]))?;
    if show_ast {
        println!("=== AST ===");
        println!("{:#?}", def);
        println!();
    }

    let code = compile_def(&def).map_err(|e| render_template_errors(&name, &source, &[e]))?;
    println!("{}", code.disassemble());
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Demo
// ============================================================================

fn declare(name: &str, fields: &[(&str, &str)], synth: &Synthesizer<'_>) -> CliResult<Rc<Class>> {
    let class = fields
        .iter()
        .fold(ClassBuilder::new(name), |builder, (field, hint)| builder.field(*field, *hint))
        .build()
        .map_err(|e| CliError::failure(e.to_string()))?;
    synth.decorate(&class).map_err(synth_failure)
}

fn show_match_args(class: &Rc<Class>) -> CliResult<String> {
    match class.lookup(magic_methods::as_str(MagicMethodId::MatchArgs)) {
        Some(ClassAttr::Value(args)) => protocol::repr(&args).map_err(runtime_failure),
        _ => Ok("(not set)".to_string()),
    }
}

/// Declare `Coordinates(x, y)` and `Empty()`, then exercise their synthesized methods.
pub fn demo(iter: bool, hash: bool, match_args: bool) -> CliResult<ExitCode> {
    let mut config = SynthConfig::default().with_match_args(match_args);
    if iter {
        config = config.with_iter();
    }
    if hash {
        config = config.with_hash();
    }

    let registry = TemplateRegistry::new();
    let synth = Synthesizer::new(&registry).with_config(config);

    let coordinates = declare("Coordinates", &[("x", "int"), ("y", "int")], &synth)?;
    let empty = declare("Empty", &[], &synth)?;

    let a = coordinates
        .call(vec![Value::Int(2), Value::Int(3)])
        .map_err(runtime_failure)?;
    let b = coordinates
        .call_with_keywords(vec![Value::Int(2)], &[("y", Value::Int(3))])
        .map_err(runtime_failure)?;
    let c = coordinates
        .call(vec![Value::Int(3), Value::Int(2)])
        .map_err(runtime_failure)?;
    let e = empty.call(Vec::new()).map_err(runtime_failure)?;

    let show = |v: &Value| protocol::repr(v).map_err(runtime_failure);
    let eq = |l: &Value, r: &Value| protocol::equals(l, r).map_err(runtime_failure);

    println!("a = {}", show(&a)?);
    println!("b = {}", show(&b)?);
    println!("c = {}", show(&c)?);
    println!("e = {}", show(&e)?);
    println!("a == b: {}", eq(&a, &b)?);
    println!("a == c: {}", eq(&a, &c)?);
    println!("a == e: {}", eq(&a, &e)?);

    if iter {
        let items = protocol::collect(&a).map_err(runtime_failure)?;
        println!("list(a) = {}", show(&Value::tuple(items))?);
    }
    if hash {
        let (ha, hb) = (
            protocol::hash(&a).map_err(runtime_failure)?,
            protocol::hash(&b).map_err(runtime_failure)?,
        );
        println!("hash(a) == hash(b): {}", ha == hb);
    }

    println!("Coordinates.__match_args__ = {}", show_match_args(&coordinates)?);
    println!(
        "templates compiled: {}, cache hits: {}",
        registry.compile_count(),
        registry.hit_count()
    );
    Ok(ExitCode::SUCCESS)
}
