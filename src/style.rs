//! CSS class configuration for rendered markdown.
//!
//! A [`StyleMap`] is immutable configuration handed to the renderer. The
//! defaults are Tailwind utility classes; any field can be overridden from a
//! settings file.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleMap {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub h4: String,
    pub h5: String,
    pub h6: String,
    pub p: String,
    pub ul: String,
    pub ol: String,
    pub li: String,
    pub blockquote: String,
    pub a: String,
    pub img: String,
    pub strong: String,
    pub em: String,
    pub hr: String,
    /// Inline `code` spans.
    pub inline_code: String,
    /// `<pre>` of a fenced code block.
    pub pre: String,
    pub table: String,
    pub th: String,
    pub td: String,
    /// Empty anchor span injected before heading text.
    pub anchor: String,
    /// Wrapper around each interleaved ad slot.
    pub ad_slot: String,
}

impl StyleMap {
    /// Class for a heading of the given level (clamped to 1-6).
    pub fn heading(&self, level: u8) -> &str {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            _ => &self.h6,
        }
    }

    /// A map with every class empty, for callers that style purely by element.
    pub fn unstyled() -> Self {
        Self {
            h1: String::new(),
            h2: String::new(),
            h3: String::new(),
            h4: String::new(),
            h5: String::new(),
            h6: String::new(),
            p: String::new(),
            ul: String::new(),
            ol: String::new(),
            li: String::new(),
            blockquote: String::new(),
            a: String::new(),
            img: String::new(),
            strong: String::new(),
            em: String::new(),
            hr: String::new(),
            inline_code: String::new(),
            pre: String::new(),
            table: String::new(),
            th: String::new(),
            td: String::new(),
            anchor: String::new(),
            ad_slot: String::new(),
        }
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        Self {
            h1: "scroll-mt-20 text-2xl md:text-3xl lg:text-4xl font-bold mt-8 mb-6 text-gray-900 dark:text-white leading-tight".into(),
            h2: "scroll-mt-16 text-xl md:text-2xl lg:text-3xl font-bold mt-7 mb-4 text-gray-800 dark:text-gray-100 leading-tight".into(),
            h3: "scroll-mt-16 text-lg md:text-xl lg:text-2xl font-semibold mt-6 mb-3 text-gray-800 dark:text-gray-100 leading-tight".into(),
            h4: "scroll-mt-16 text-sm md:text-lg font-semibold mt-3 mb-2 text-gray-700 dark:text-gray-200".into(),
            h5: "scroll-mt-16 text-xs md:text-base font-semibold mt-3 mb-2 text-gray-700 dark:text-gray-200".into(),
            h6: "scroll-mt-16 text-xs md:text-sm font-semibold mt-3 mb-2 text-gray-700 dark:text-gray-200".into(),
            p: "my-4 text-sm md:text-base lg:text-lg text-gray-700 dark:text-gray-300 leading-relaxed break-words".into(),
            ul: "my-4 pl-5 md:pl-6 list-disc text-sm md:text-base lg:text-lg text-gray-700 dark:text-gray-300 space-y-2 md:space-y-3".into(),
            ol: "my-4 pl-5 md:pl-6 list-decimal text-sm md:text-base lg:text-lg text-gray-700 dark:text-gray-300 space-y-2 md:space-y-3".into(),
            li: "ml-2 md:ml-2 leading-relaxed break-words pb-1".into(),
            blockquote: "pl-4 md:pl-5 my-4 md:my-5 border-l-4 border-blue-500 dark:border-blue-400 italic text-sm md:text-base lg:text-lg text-gray-600 dark:text-gray-400 bg-gray-50 dark:bg-gray-800 py-2 px-3 rounded".into(),
            a: "text-blue-600 dark:text-blue-400 hover:underline hover:text-blue-800 dark:hover:text-blue-300 transition-colors duration-200 break-words inline-block".into(),
            img: "max-w-full h-auto rounded-lg shadow-md object-cover my-6 mx-auto".into(),
            strong: "font-semibold text-gray-900 dark:text-white".into(),
            em: "italic".into(),
            hr: "my-4 md:my-6 border-gray-200 dark:border-gray-700".into(),
            inline_code: "font-mono text-sm md:text-base bg-gray-100 dark:bg-gray-800 px-1.5 py-0.5 rounded text-pink-600 dark:text-pink-400".into(),
            pre: "my-0 overflow-x-auto text-xs md:text-sm".into(),
            table: "min-w-full my-6 border-collapse border border-gray-300 dark:border-gray-700 rounded-lg overflow-hidden".into(),
            th: "bg-gray-100 dark:bg-gray-800 px-4 py-2 text-left font-semibold text-gray-700 dark:text-gray-300 border border-gray-300 dark:border-gray-700".into(),
            td: "px-4 py-2 border border-gray-300 dark:border-gray-700 text-gray-700 dark:text-gray-300".into(),
            anchor: "block".into(),
            ad_slot: "my-8 py-4 border-t border-b border-gray-200 dark:border-gray-700".into(),
        }
    }
}
