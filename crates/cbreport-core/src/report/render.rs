//! Column-aligned rendering of report trees
//!
//! Rendering takes two passes over the tree. The first measures the widest
//! key (each nesting level adds one indentation step) and the widest integer
//! part of any numeric value. The second prints sections before scalars at
//! every level, placing all values in one column and padding numbers so their
//! integer parts line up.

use super::tree::{ReportNode, ReportTree, ReportValue};

/// Widths measured over a whole tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnWidths {
    /// Widest key, including the indentation of its level
    pub key_width: usize,
    /// Widest integer part of a numeric value
    pub integer_width: usize,
}

/// Renders [`ReportTree`]s as indented text
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    indent: usize,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ReportRenderer {
    /// A renderer adding `indent` columns per nesting level
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Width pass
    pub fn measure(&self, tree: &ReportTree) -> ColumnWidths {
        let mut widths = ColumnWidths::default();
        for (key, node) in tree.iter() {
            let (key_width, integer_width) = match node {
                ReportNode::Section(section) => {
                    let inner = self.measure(section);
                    (inner.key_width + self.indent, inner.integer_width)
                }
                ReportNode::Value(value) => (key.chars().count(), value.integer_width()),
            };
            widths.key_width = widths.key_width.max(key_width);
            widths.integer_width = widths.integer_width.max(integer_width);
        }
        widths
    }

    /// Render a tree, labelling nested sections from `labels`
    ///
    /// Top-level sections are printed without a label. Below that, each
    /// nesting level takes the next label, until the labels run out.
    pub fn render(&self, tree: &ReportTree, labels: &[String]) -> String {
        let widths = self.measure(tree);
        let mut out = String::new();
        self.print_level(&mut out, tree, labels, 0, widths);
        out
    }

    fn print_level(
        &self,
        out: &mut String,
        tree: &ReportTree,
        labels: &[String],
        key_column: usize,
        widths: ColumnWidths,
    ) {
        let mut sections: Vec<(&str, &ReportTree)> = Vec::new();
        let mut values: Vec<(&str, &ReportValue)> = Vec::new();
        for (key, node) in tree.iter() {
            match node {
                ReportNode::Section(section) => sections.push((key, section)),
                ReportNode::Value(value) => values.push((key, value)),
            }
        }

        let (label, remaining) = match labels.split_first() {
            Some((label, rest)) if key_column > 0 => (Some(label), rest),
            _ => (None, labels),
        };

        let margin = " ".repeat(key_column);
        for (key, section) in &sections {
            match label {
                Some(label) => out.push_str(&format!("{}{}: {}:\n", margin, label, key)),
                None => out.push_str(&format!("{} {}:\n", margin, key)),
            }
            self.print_level(out, section, remaining, key_column + self.indent, widths);
        }

        for (key, value) in &values {
            let integer_pad = match value {
                ReportValue::Text(_) => 0,
                numeric => widths.integer_width.saturating_sub(numeric.integer_width()),
            };
            let padding = (widths.key_width + integer_pad)
                .saturating_sub(key_column + key.chars().count());
            out.push_str(&format!("{}{}: {}{}\n", margin, key, " ".repeat(padding), value));
        }

        if sections.is_empty() {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ReportTree {
        let mut tree = ReportTree::new();
        tree.insert("B", 3i64);
        let a = tree.section_mut("A");
        a.insert("x", 1i64);
        a.insert("y", 22i64);
        tree
    }

    #[test]
    fn test_measure() {
        let widths = ReportRenderer::new(4).measure(&sample());
        assert_eq!(widths, ColumnWidths { key_width: 5, integer_width: 2 });
    }

    #[test]
    fn test_sections_before_values_and_aligned() {
        let text = ReportRenderer::new(4).render(&sample(), &["Section".to_string()]);
        let expected = " A:\n    x:  1\n    y: 22\n\nB:      3\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_labels_consumed_per_level() {
        let mut tree = ReportTree::new();
        let detail = tree.section_mut("Detail");
        detail.section_mut("ns1").section_mut("pod-a").insert("cpu", 1.5);
        let labels = vec!["namespace".to_string(), "pod".to_string()];

        let text = ReportRenderer::new(4).render(&tree, &labels);
        let expected = concat!(
            " Detail:\n",
            "    namespace: ns1:\n",
            "        pod: pod-a:\n",
            "            cpu: 1.5\n",
            "\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_labels_exhausted_fall_back_to_bare_keys() {
        let mut tree = ReportTree::new();
        tree.section_mut("Top").section_mut("one").section_mut("two");
        let text = ReportRenderer::new(2).render(&tree, &["L".to_string()]);
        let expected = " Top:\n  L: one:\n     two:\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_values_align_on_key_column() {
        let mut tree = ReportTree::new();
        let overview = tree.section_mut("Overview");
        overview.insert("Workload", "cpusoaker");
        overview.insert("Run host", "bastion");
        let summary = tree.section_mut("Summary");
        summary.insert("Total Clients", 12i64);
        summary.insert("Overlap error", 0.15);

        let text = ReportRenderer::new(4).render(&tree, &[]);
        let expected = concat!(
            " Overview:\n",
            "    Workload:      cpusoaker\n",
            "    Run host:      bastion\n",
            "\n",
            " Summary:\n",
            "    Total Clients: 12\n",
            "    Overlap error:  0.15\n",
            "\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_tree_renders_blank_line() {
        let text = ReportRenderer::default().render(&ReportTree::new(), &[]);
        assert_eq!(text, "\n");
    }

    #[test]
    fn test_render_does_not_mutate() {
        let tree = sample();
        let before = tree.clone();
        let _ = ReportRenderer::default().render(&tree, &[]);
        assert_eq!(tree, before);
    }
}
