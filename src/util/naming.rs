//! Identifier normalization.

use heck::ToSnakeCase;

/// Convert an identifier to its canonical lowercase-with-underscores form.
///
/// `AlphaModel` becomes `alpha_model`, `HTTPServer` becomes `http_server`.
pub fn snake_case(name: &str) -> String {
    name.to_snake_case()
}
