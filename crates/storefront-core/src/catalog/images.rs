//! Fallback product images.
//!
//! The vector index does not always carry an image location. Search results
//! still need one, so a generic image is picked from keywords in the name.

const IMAGE_BASE: &str = "/api/inventory/images";

/// Picks a generic image for a product from its name.
///
/// ```
/// use storefront_core::catalog::resolve_image_url;
///
/// assert_eq!(resolve_image_url("Logitech Wireless Mouse"), "/api/inventory/images/mouse.svg");
/// assert_eq!(resolve_image_url("Wool Beanie"), "/api/inventory/images/placeholder.svg");
/// ```
pub fn resolve_image_url(product_name: &str) -> String {
    let name = product_name.to_lowercase();

    let image = if name.contains("mouse") {
        "mouse.svg"
    } else if name.contains("keyboard") {
        "keyboard.svg"
    } else if ["monitor", "display", "screen"]
        .iter()
        .any(|word| name.contains(word))
    {
        "monitor.svg"
    } else {
        "placeholder.svg"
    };

    format!("{IMAGE_BASE}/{image}")
}
