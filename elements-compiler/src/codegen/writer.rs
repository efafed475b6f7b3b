/// Accumulates generated text with a fixed indentation unit.
pub(crate) struct Compose {
    out: String,
    indent_width: usize,
}

impl Compose {
    pub(crate) fn new(indent_width: usize) -> Self {
        Self {
            out: String::new(),
            indent_width,
        }
    }

    pub(crate) fn indent(&mut self, depth: usize) -> &mut Self {
        self.out.extend(std::iter::repeat_n(' ', depth * self.indent_width));
        self
    }

    pub(crate) fn push(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    /// Indented text followed by a newline.
    pub(crate) fn line(&mut self, depth: usize, text: &str) -> &mut Self {
        self.indent(depth).push(text).push("\n")
    }

    pub(crate) fn newline(&mut self) -> &mut Self {
        self.push("\n")
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}
