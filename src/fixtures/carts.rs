//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in the order they were added
    pub lines: Vec<CartLineFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key from the products fixture
    pub product: String,

    /// Units on the line
    pub quantity: u32,

    /// Chosen size
    #[serde(default)]
    pub size: Option<String>,

    /// Chosen color
    #[serde(default)]
    pub color: Option<String>,

    /// Whether the line is selected for checkout
    #[serde(default = "selected_by_default")]
    pub selected: bool,
}

fn selected_by_default() -> bool {
    true
}
