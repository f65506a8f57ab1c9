//! Minimal human-readable ABI signatures, e.g.
//! `function transfer(address,uint256) returns (bool)`.
//!
//! Parameter names are dropped, `indexed` is kept. Fallback and receive
//! entries have no signature form and are skipped.

use ethers::abi::ethabi::AbiError;
use ethers::abi::{Abi, Constructor, Event, Function, Param, ParamType, StateMutability};
use eyre::Context;
use serde_json::Value;

/// One signature per ABI entry, in the order the compiler emitted them.
pub fn format_abi(raw_abi: &[Value]) -> eyre::Result<Vec<String>> {
    let mut lines = vec![];

    for entry in raw_abi {
        let abi: Abi = serde_json::from_value(Value::Array(vec![entry.clone()]))
            .with_context(|| format!("Parsing ABI entry {entry}"))?;

        if let Some(constructor) = &abi.constructor {
            lines.push(format_constructor(constructor, is_payable(entry)));
        }

        lines.extend(abi.functions().map(format_function));
        lines.extend(abi.events().map(format_event));
        lines.extend(abi.errors().map(format_error));
    }

    Ok(lines)
}

/// Covers both `stateMutability` and the pre 0.6 `payable` flag.
fn is_payable(entry: &Value) -> bool {
    entry.get("stateMutability").and_then(Value::as_str) == Some("payable")
        || entry.get("payable").and_then(Value::as_bool) == Some(true)
}

pub fn format_param_type(kind: &ParamType) -> String {
    match kind {
        ParamType::Address => "address".to_string(),
        ParamType::Bytes => "bytes".to_string(),
        ParamType::Int(size) => format!("int{size}"),
        ParamType::Uint(size) => format!("uint{size}"),
        ParamType::Bool => "bool".to_string(),
        ParamType::String => "string".to_string(),
        ParamType::Array(inner) => format!("{}[]", format_param_type(inner)),
        ParamType::FixedBytes(size) => format!("bytes{size}"),
        ParamType::FixedArray(inner, size) => {
            format!("{}[{size}]", format_param_type(inner))
        }
        ParamType::Tuple(components) => {
            let components: Vec<_> =
                components.iter().map(format_param_type).collect();
            format!("tuple({})", components.join(","))
        }
    }
}

fn format_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|param| format_param_type(&param.kind))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_constructor(constructor: &Constructor, payable: bool) -> String {
    let mut result = format!("constructor({})", format_params(&constructor.inputs));

    if payable {
        result.push_str(" payable");
    }

    result
}

pub fn format_function(function: &Function) -> String {
    let mut result =
        format!("function {}({})", function.name, format_params(&function.inputs));

    match function.state_mutability {
        StateMutability::Pure => result.push_str(" pure"),
        StateMutability::View => result.push_str(" view"),
        StateMutability::Payable => result.push_str(" payable"),
        StateMutability::NonPayable => {}
    }

    if !function.outputs.is_empty() {
        result.push_str(&format!(" returns ({})", format_params(&function.outputs)));
    }

    result
}

pub fn format_event(event: &Event) -> String {
    let inputs: Vec<_> = event
        .inputs
        .iter()
        .map(|input| {
            let kind = format_param_type(&input.kind);
            if input.indexed {
                format!("{kind} indexed")
            } else {
                kind
            }
        })
        .collect();

    let mut result = format!("event {}({})", event.name, inputs.join(","));

    if event.anonymous {
        result.push_str(" anonymous");
    }

    result
}

pub fn format_error(error: &AbiError) -> String {
    format!("error {}({})", error.name, format_params(&error.inputs))
}
