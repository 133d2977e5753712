//! jq-style pre-filtering of input documents.
//!
//! Introspector dumps rarely arrive as a bare graph; they tend to be
//! wrapped in tool envelopes. A small jq program run over each input
//! document lets the CLI slice the graph out without a separate tool.

use anyhow::{anyhow, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `program` over `input`, returning every produced value.
pub fn apply(program: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let file = load::File {
        code: program,
        path: (),
    };

    let modules = loader
        .load(&arena, file)
        .map_err(|errs| collect_errors("jq parse error", errs.into_iter().map(|(_, e)| format!("{e:?}"))))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| {
            collect_errors(
                "jq compile error",
                errs.into_iter().flat_map(|(_, list)| {
                    list.into_iter()
                        .map(|(name, undef): (&str, Undefined)| format!("undefined `{name}`: {undef:?}"))
                }),
            )
        })?;

    let inputs = RcIter::new(core::iter::empty());
    let mut out = Vec::new();
    for item in filter.run((Ctx::new([], &inputs), Val::from(input.clone()))) {
        let val = item.map_err(|e| anyhow!("jq runtime error: {e:?}"))?;
        out.push(Value::from(val));
    }
    Ok(out)
}

fn collect_errors(label: &str, details: impl Iterator<Item = String>) -> anyhow::Error {
    let mut s = String::from(label);
    for detail in details {
        s.push_str("\n  ");
        s.push_str(&detail);
    }
    anyhow!(s)
}
