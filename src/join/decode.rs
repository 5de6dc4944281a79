//! Tool-specific decoding of a request/result pair into an [`Operation`].

use super::read_content::normalize_read_output;
use super::JoinOptions;
use crate::model::{
    BashOp, EditOp, EditSpec, IncompleteOp, IncompleteReason, MultiEditOp, Operation, OtherOp,
    ReadOp, ToolCall, ToolName, ToolOutcome, ToolResult, WriteOp,
};
use serde_json::Value;
use tracing::warn;

/// Build the operation for a completed request.
///
/// `tool_use_result` is the structured metadata recorded on the entry that
/// carried the result, when present.
pub(crate) fn decode(
    call: &ToolCall,
    result: &ToolResult,
    tool_use_result: Option<&Value>,
    options: &JoinOptions,
) -> Operation {
    let name = call.name();
    let is_edit = matches!(name, ToolName::Edit | ToolName::MultiEdit);

    if result.is_error() && !is_edit {
        return Operation::Incomplete(IncompleteOp {
            request: call.clone(),
            reason: IncompleteReason::ToolError {
                message: result.content().to_string(),
            },
        });
    }

    let decoded = match name {
        ToolName::Read => decode_read(call, result, tool_use_result, options),
        ToolName::Write => decode_write(call),
        ToolName::Edit => decode_edit(call, result),
        ToolName::MultiEdit => decode_multi_edit(call, result),
        ToolName::Bash => decode_bash(call, result),
        _ => return other(call, result),
    };

    match decoded {
        Ok(operation) => operation,
        Err(field) => {
            warn!(
                "{} request {} is missing '{}'; treating it as an opaque operation",
                name.as_str(),
                call.id(),
                field
            );
            other(call, result)
        }
    }
}

fn other(call: &ToolCall, result: &ToolResult) -> Operation {
    Operation::Other(OtherOp {
        tool_name: call.name().clone(),
        input: call.input().clone(),
        output: result.content().to_string(),
    })
}

fn required<'a>(call: &'a ToolCall, field: &'static str) -> Result<&'a str, &'static str> {
    call.input_str(field).ok_or(field)
}

fn required_path<'a>(call: &'a ToolCall) -> Result<&'a str, &'static str> {
    required(call, "file_path").and_then(|p| if p.is_empty() { Err("file_path") } else { Ok(p) })
}

fn outcome(result: &ToolResult) -> ToolOutcome {
    if result.is_error() {
        ToolOutcome::Failed {
            message: result.content().to_string(),
        }
    } else {
        ToolOutcome::Succeeded
    }
}

fn decode_read(
    call: &ToolCall,
    result: &ToolResult,
    tool_use_result: Option<&Value>,
    options: &JoinOptions,
) -> Result<Operation, &'static str> {
    let path = required_path(call)?;
    let offset = call.input().get("offset").and_then(Value::as_u64);
    let limit = call.input().get("limit").and_then(Value::as_u64);
    let is_partial = offset.is_some() || limit.is_some() || reports_truncation(tool_use_result);

    let content = if options.normalize_read_output {
        normalize_read_output(result.content())
    } else {
        result.content().to_string()
    };

    Ok(Operation::Read(ReadOp {
        path: path.to_string(),
        content,
        is_partial,
        offset,
        limit,
    }))
}

/// Whether the structured Read metadata says the output is not the whole file.
fn reports_truncation(tool_use_result: Option<&Value>) -> bool {
    let Some(meta) = tool_use_result else {
        return false;
    };
    let file = meta.get("file").unwrap_or(&Value::Null);

    let truncated_flag = |v: &Value| v.get("truncated").and_then(Value::as_bool) == Some(true);
    if truncated_flag(meta) || truncated_flag(file) {
        return true;
    }

    match (
        file.get("numLines").and_then(Value::as_u64),
        file.get("totalLines").and_then(Value::as_u64),
    ) {
        (Some(num), Some(total)) => num < total,
        _ => false,
    }
}

fn decode_write(call: &ToolCall) -> Result<Operation, &'static str> {
    Ok(Operation::Write(WriteOp {
        path: required_path(call)?.to_string(),
        content: required(call, "content")?.to_string(),
    }))
}

fn edit_spec(input: &Value) -> Result<EditSpec, &'static str> {
    let field = |name: &'static str| {
        input
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(name)
    };
    Ok(EditSpec {
        old_string: field("old_string")?,
        new_string: field("new_string")?,
        replace_all: input
            .get("replace_all")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn decode_edit(call: &ToolCall, result: &ToolResult) -> Result<Operation, &'static str> {
    let path = required_path(call)?;
    Ok(Operation::Edit(EditOp {
        path: path.to_string(),
        edit: edit_spec(call.input())?,
        tool_outcome: outcome(result),
    }))
}

fn decode_multi_edit(call: &ToolCall, result: &ToolResult) -> Result<Operation, &'static str> {
    let path = required_path(call)?;
    let edits = call
        .input()
        .get("edits")
        .and_then(Value::as_array)
        .ok_or("edits")?
        .iter()
        .map(edit_spec)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Operation::MultiEdit(MultiEditOp {
        path: path.to_string(),
        edits,
        tool_outcome: outcome(result),
    }))
}

fn decode_bash(call: &ToolCall, result: &ToolResult) -> Result<Operation, &'static str> {
    Ok(Operation::BashCommand(BashOp {
        command: required(call, "command")?.to_string(),
        output: result.content().to_string(),
    }))
}
