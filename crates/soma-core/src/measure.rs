//! Text measurement.
//!
//! Hit-testing and selection outlines need the rendered extent of a text
//! run. The real numbers come from the platform (Canvas2D `measureText` in
//! the browser); [`ApproxMeasurer`] gives deterministic metrics for headless
//! use and tests.

use crate::model::{FontFamily, TextElement};
use std::cell::RefCell;
use std::collections::HashMap;

/// Extent of a single line of text, relative to its alphabetic baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl TextMetrics {
    /// Ink height, falling back to `font_size` when the platform reports no
    /// vertical metrics (empty strings, old engines).
    pub fn height_or(&self, font_size: f64) -> f64 {
        let h = self.ascent + self.descent;
        if h > 0.0 { h } else { font_size }
    }
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics;

    fn measure_element(&self, element: &TextElement) -> TextMetrics {
        self.measure(&element.text, element.font_family, element.font_size)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics {
        (**self).measure(text, family, font_size)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for Box<M> {
    fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics {
        (**self).measure(text, family, font_size)
    }
}

/// Fixed-advance approximation: every char is `advance × font_size` wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasurer;

impl ApproxMeasurer {
    fn advance(family: FontFamily) -> f64 {
        match family {
            FontFamily::Saira => 0.55,
            FontFamily::Manrope => 0.6,
        }
    }
}

impl TextMeasurer for ApproxMeasurer {
    fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics {
        let chars = text.chars().count() as f64;
        if chars == 0.0 {
            return TextMetrics::default();
        }
        TextMetrics {
            width: chars * font_size * Self::advance(family),
            ascent: font_size * 0.75,
            descent: font_size * 0.25,
        }
    }
}

type CacheKey = (String, FontFamily, u64);

/// Memoizes another measurer per (text, family, size).
pub struct CachedMeasurer<M> {
    inner: M,
    cache: RefCell<HashMap<CacheKey, TextMetrics>>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Drop all entries, e.g. after web fonts finish loading.
    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics {
        let key = (text.to_string(), family, font_size.to_bits());
        if let Some(m) = self.cache.borrow().get(&key) {
            return *m;
        }
        let m = self.inner.measure(text, family, font_size);
        self.cache.borrow_mut().insert(key, m);
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting<'a>(&'a Cell<u32>);

    impl TextMeasurer for Counting<'_> {
        fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics {
            self.0.set(self.0.get() + 1);
            ApproxMeasurer.measure(text, family, font_size)
        }
    }

    #[test]
    fn approx_scales_with_size() {
        let a = ApproxMeasurer.measure("abcd", FontFamily::Saira, 10.0);
        let b = ApproxMeasurer.measure("abcd", FontFamily::Saira, 20.0);
        assert!((b.width - 2.0 * a.width).abs() < 1e-9);
        assert_eq!(a.height_or(10.0), 10.0);
    }

    #[test]
    fn empty_text_falls_back_to_font_size() {
        let m = ApproxMeasurer.measure("", FontFamily::Manrope, 48.0);
        assert_eq!(m.width, 0.0);
        assert_eq!(m.height_or(48.0), 48.0);
    }

    #[test]
    fn cache_hits_skip_inner() {
        let calls = Cell::new(0);
        let cached = CachedMeasurer::new(Counting(&calls));
        cached.measure("Hola", FontFamily::Saira, 48.0);
        cached.measure("Hola", FontFamily::Saira, 48.0);
        cached.measure("Hola", FontFamily::Saira, 49.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(cached.cached_entries(), 2);
        cached.invalidate();
        assert_eq!(cached.cached_entries(), 0);
    }
}
