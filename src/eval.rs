//! Expression evaluation boundary.
//!
//! A column expression is user-authored script text in which the literal token
//! `{E}` stands for the current row record. Evaluation is a pure string
//! substitution of that token followed by running the script in an isolated,
//! per-invocation Lua state: nothing persists between cells or rows, so the
//! host table may render cells in any order with identical results.

use anyhow::Result;
use mlua::Lua;
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter};

/// Literal token in expression text standing for the current row record.
/// Substitution is textual, case-sensitive and single-token.
pub const PLACEHOLDER_TOKEN: &str = "{E}";

/// Name of the script-side variable the record is bound to.
pub const RECORD_VAR: &str = "__record__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// The expression did not compile (syntax error).
    Compile,
    /// The expression compiled but failed while running.
    Runtime,
}

#[derive(Debug, Clone)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
}

impl EvalError {
    pub fn compile<S: Into<String>>(msg: S) -> Self {
        Self { kind: EvalErrorKind::Compile, message: msg.into() }
    }
    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        Self { kind: EvalErrorKind::Runtime, message: msg.into() }
    }
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// Pluggable expression engine. One implementation per scripting engine;
/// every implementation must keep the per-invocation isolation contract.
pub trait ExpressionEvaluator {
    /// Evaluate one column expression against one row record.
    ///
    /// `Ok(Some(text))` is the rendered value, `Ok(None)` means the script
    /// produced no value (renders as an empty cell). A blank expression is
    /// `Ok(None)` without invoking the engine.
    fn evaluate(&self, expression: &str, record: &JsonValue) -> Result<Option<String>, EvalError>;
}

/// Lua-backed evaluator. Creates a fresh VM for every invocation; the record
/// is exposed as a global table under [`RECORD_VAR`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LuaEvaluator;

impl LuaEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for LuaEvaluator {
    fn evaluate(&self, expression: &str, record: &JsonValue) -> Result<Option<String>, EvalError> {
        if expression.trim().is_empty() {
            return Ok(None);
        }
        let script = expression.replace(PLACEHOLDER_TOKEN, RECORD_VAR);

        let lua = Lua::new();
        let bound = json_to_lua(&lua, record)
            .map_err(|e| EvalError::runtime(format!("binding record: {}", e)))?;
        lua.globals()
            .set(RECORD_VAR, bound)
            .map_err(|e| EvalError::runtime(format!("binding record: {}", e)))?;

        let out: mlua::Value = lua.load(script.as_str()).eval().map_err(classify_lua_error)?;
        render_value(out).map_err(|e| EvalError::runtime(e.to_string()))
    }
}

fn classify_lua_error(err: mlua::Error) -> EvalError {
    match &err {
        mlua::Error::SyntaxError { message, .. } => EvalError::compile(message.clone()),
        _ => EvalError::runtime(err.to_string()),
    }
}

/// Render an evaluation result for display. Strings render verbatim, scalars
/// via their display form, tables as JSON text; nil is "no value".
fn render_value(value: mlua::Value) -> Result<Option<String>> {
    let text = match value {
        mlua::Value::Nil => return Ok(None),
        mlua::Value::String(s) => s.to_str()?.to_string(),
        mlua::Value::Boolean(b) => b.to_string(),
        mlua::Value::Integer(i) => i.to_string(),
        mlua::Value::Number(n) => n.to_string(),
        other => {
            let json = lua_to_json(other)?;
            serde_json::to_string(&json)?
        }
    };
    Ok(Some(text))
}

fn json_to_lua<'lua>(lua: &'lua Lua, v: &JsonValue) -> Result<mlua::Value<'lua>> {
    use mlua::Value as LVal;
    let lv = match v {
        JsonValue::Null => LVal::Nil,
        JsonValue::Bool(b) => LVal::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() { LVal::Integer(i) } else { LVal::Number(n.as_f64().unwrap_or(0.0)) }
        }
        JsonValue::String(s) => LVal::String(lua.create_string(s)?),
        JsonValue::Array(arr) => {
            let tbl = lua.create_table()?;
            for (i, item) in arr.iter().enumerate() { tbl.set((i + 1) as i64, json_to_lua(lua, item)?)?; }
            LVal::Table(tbl)
        }
        JsonValue::Object(map) => {
            let tbl = lua.create_table()?;
            for (k, val) in map.iter() { tbl.set(k.as_str(), json_to_lua(lua, val)?)?; }
            LVal::Table(tbl)
        }
    };
    Ok(lv)
}

fn lua_to_json(v: mlua::Value) -> Result<JsonValue> {
    use mlua::Value as LVal;
    let j = match v {
        LVal::Nil => JsonValue::Null,
        LVal::Boolean(b) => JsonValue::Bool(b),
        LVal::Integer(i) => serde_json::json!(i),
        LVal::Number(f) => serde_json::json!(f),
        LVal::String(s) => JsonValue::String(s.to_str()?.to_string()),
        LVal::Table(t) => {
            // Try array-like first
            let mut is_array = true;
            let mut max_idx = 0i64;
            for pair in t.clone().pairs::<mlua::Value, mlua::Value>() {
                let (k, _v) = pair?;
                match k {
                    LVal::Integer(i) => { if i > max_idx { max_idx = i; } }
                    _ => { is_array = false; break; }
                }
            }
            if is_array && max_idx > 0 {
                let mut arr: Vec<JsonValue> = Vec::new();
                for i in 1..=max_idx {
                    let val = t.get::<i64, mlua::Value>(i).unwrap_or(mlua::Value::Nil);
                    arr.push(lua_to_json(val)?);
                }
                JsonValue::Array(arr)
            } else {
                let mut map = serde_json::Map::new();
                for pair in t.pairs::<mlua::Value, mlua::Value>() {
                    let (k, v) = pair?;
                    if let LVal::String(s) = k { map.insert(s.to_str()?.to_string(), lua_to_json(v)?); }
                }
                JsonValue::Object(map)
            }
        }
        _ => JsonValue::Null,
    };
    Ok(j)
}

/// Outcome of the explicit "test this expression" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The expression is considered usable.
    Valid,
    /// The expression failed to compile; carries the blocking warning detail.
    CompilationFailed(String),
}

/// Verify an expression once against a representative placeholder record.
///
/// Deliberately permissive: only a compilation failure blocks. A runtime
/// failure against the placeholder record (which usually carries no real
/// field values) still reports valid, and a blank expression is valid
/// without invoking the engine.
pub fn verify_expression(
    evaluator: &dyn ExpressionEvaluator,
    expression: &str,
    sample_record: &JsonValue,
) -> VerifyOutcome {
    if expression.trim().is_empty() {
        return VerifyOutcome::Valid;
    }
    match evaluator.evaluate(expression, sample_record) {
        Err(EvalError { kind: EvalErrorKind::Compile, message }) => {
            VerifyOutcome::CompilationFailed(message)
        }
        _ => VerifyOutcome::Valid,
    }
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod eval_tests;
