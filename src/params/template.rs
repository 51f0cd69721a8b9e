//! writer for configuration templates and default-value dumps

const INDENT_STEP: usize = 4;

/// accumulates indented configuration text
#[derive(Debug, Default)]
pub struct TemplateWriter {
    out: String,
}

impl TemplateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self, level: usize) {
        self.out.extend(std::iter::repeat(' ').take(level * INDENT_STEP));
    }

    /// `name [id] {`
    pub fn begin_block(&mut self, level: usize, name: &str, id: Option<&str>) {
        self.indent(level);
        match id {
            Some(id) => self.out.push_str(&format!("{} {}\n", name, id)),
            None => self.out.push_str(&format!("{}\n", name)),
        }
        self.indent(level);
        self.out.push_str("{\n");
    }

    pub fn end_block(&mut self, level: usize) {
        self.indent(level);
        self.out.push_str("}\n");
    }

    pub fn line(&mut self, level: usize, text: &str) {
        self.indent(level);
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `name = value ;`
    pub fn param(&mut self, level: usize, name: &str, value: &str) {
        self.line(level, &format!("{:<24} = {} ;", name, value));
    }

    pub fn comment(&mut self, level: usize, text: &str) {
        self.line(level, &format!("# {}", text));
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut w = TemplateWriter::new();
        w.begin_block(0, "FileClass", Some("logs"));
        w.begin_block(1, "definition", None);
        w.line(2, "name == \"*.log\"");
        w.end_block(1);
        w.end_block(0);

        assert_eq!(
            w.into_string(),
            "FileClass logs\n{\n    definition\n    {\n        name == \"*.log\"\n    }\n}\n"
        );
    }

    #[test]
    fn test_param_and_comment() {
        let mut w = TemplateWriter::new();
        w.comment(1, "interval between checks");
        w.param(1, "check_interval", "5min");
        assert_eq!(
            w.as_str(),
            format!(
                "    # interval between checks\n    check_interval{} = 5min ;\n",
                " ".repeat(24 - "check_interval".len())
            )
        );
    }
}
