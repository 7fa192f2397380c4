/*!
 * Placeholder tokens for template construction.
 *
 * A placeholder stands in for a region or unit while a document is taken
 * apart and put back together. Tokens start with a DEL control character,
 * which marker ids are not allowed to contain, and every token is checked
 * against the source text so it can never collide with real content.
 */

use rand::Rng;

/// Prefix of every placeholder token
pub const PLACEHOLDER_PREFIX: &str = "\u{7f}UNIQ";

/// Produces placeholders that are unique within one parse
#[derive(Debug)]
pub struct PlaceholderFactory<'a> {
    /// Text the placeholders must not collide with
    source: &'a str,
    /// Tokens handed out so far
    counter: usize,
}

impl<'a> PlaceholderFactory<'a> {
    /// Create a factory for the given source text
    pub fn new(source: &'a str) -> Self {
        Self { source, counter: 0 }
    }

    /// Produce a fresh placeholder.
    ///
    /// The trailing counter makes tokens from the same factory distinct; the
    /// random part keeps them from matching text in the source.
    pub fn make(&mut self) -> String {
        let mut rng = rand::rng();
        loop {
            let token = format!(
                "{}{:08x}{:08x}|{}\u{7f}",
                PLACEHOLDER_PREFIX,
                rng.random::<u32>(),
                rng.random::<u32>(),
                self.counter
            );
            self.counter += 1;
            if !self.source.contains(&token) {
                return token;
            }
        }
    }

    /// Number of placeholders produced so far
    pub fn count(&self) -> usize {
        self.counter
    }
}
