use serde::{Deserialize, Serialize};

/// Result record of `evaluate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateOutput {
    pub ast: String,
    pub value: String,
}

/// Result record of `balance`.
///
/// Accepts both the camelCase field names and the snake_case ones exported by
/// the wasm-bindgen build of the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOutput {
    #[serde(alias = "input_ast")]
    pub input_ast: String,
    #[serde(alias = "input_str")]
    pub input_expr: String,
    #[serde(alias = "output_ast")]
    pub output_ast: String,
    #[serde(alias = "output_str")]
    pub output_expr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    Evaluate(EvaluateOutput),
    Balance(BalanceOutput),
}

/// How the value cell of a result row is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Multi-line debug tree, kept preformatted.
    Tree,
    /// Single expression.
    Value,
}

impl CellStyle {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Tree => "pre",
            Self::Value => "code",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub label: &'static str,
    pub style: CellStyle,
    pub text: String,
}

impl ResultRow {
    fn new(label: &'static str, style: CellStyle, text: &str) -> Self {
        Self {
            label,
            style,
            text: text.to_string(),
        }
    }
}

impl OperationOutput {
    /// Rows of the result table, in the fixed order of the operation.
    pub fn rows(&self) -> Vec<ResultRow> {
        match self {
            Self::Evaluate(output) => vec![
                ResultRow::new("AST TREE", CellStyle::Tree, &output.ast),
                ResultRow::new("VALUE", CellStyle::Value, &output.value),
            ],
            Self::Balance(output) => vec![
                ResultRow::new("INPUT AST TREE", CellStyle::Tree, &output.input_ast),
                ResultRow::new("INPUT VALUE", CellStyle::Value, &output.input_expr),
                ResultRow::new("OUTPUT AST TREE", CellStyle::Tree, &output.output_ast),
                ResultRow::new("OUTPUT VALUE", CellStyle::Value, &output.output_expr),
            ],
        }
    }
}
