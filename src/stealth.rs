//! Automation-mask script installed on every new page.
//!
//! Catalog sites fingerprint headless browsers before serving product
//! pages. This script runs before any page script and pins the navigator
//! and WebGL surfaces to values matching a desktop Chrome install:
//! `webdriver` hidden, `en-US` locale, Google vendor, Win32 platform, and
//! Intel WebGL strings.

/// JS evaluated on every new document, ahead of page scripts.
const INIT_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
Object.defineProperty(navigator, 'vendor', { get: () => 'Google Inc.' });
Object.defineProperty(navigator, 'platform', { get: () => 'Win32' });

// UNMASKED_VENDOR_WEBGL / UNMASKED_RENDERER_WEBGL
const getParameter = WebGLRenderingContext.prototype.getParameter;
WebGLRenderingContext.prototype.getParameter = function (parameter) {
    if (parameter === 37445) { return 'Intel Inc.'; }
    if (parameter === 37446) { return 'Intel Iris OpenGL Engine'; }
    return getParameter.call(this, parameter);
};

window.chrome = window.chrome || { runtime: {} };
"#;

/// The init script source, ready for `Page.addScriptToEvaluateOnNewDocument`.
pub fn init_script() -> &'static str {
    INIT_SCRIPT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_script_masks_webdriver() {
        let js = init_script();
        assert!(js.contains("'webdriver'"));
        assert!(js.contains("undefined"));
    }

    #[test]
    fn test_init_script_pins_fingerprint_surfaces() {
        let js = init_script();
        assert!(js.contains("'en-US', 'en'"));
        assert!(js.contains("Google Inc."));
        assert!(js.contains("Win32"));
        assert!(js.contains("Intel Iris OpenGL Engine"));
        assert!(js.contains("37445"));
        assert!(js.contains("37446"));
    }
}
