use super::{ClusterError, Linkage};

impl Linkage {
    /// Ultrametric Newick rendering of the tree.
    ///
    /// Node height is half the merge distance; each branch carries the
    /// difference between its parent's height and its own. Labels that
    /// contain Newick punctuation or whitespace are single-quoted.
    pub fn to_newick(&self, labels: &[String]) -> Result<String, ClusterError> {
        if labels.len() != self.leaves() {
            return Err(ClusterError::LabelMismatch {
                expected: self.leaves(),
                actual: labels.len(),
            });
        }
        let mut out = String::new();
        self.write_node(self.root(), labels, &mut out);
        out.push(';');
        Ok(out)
    }

    fn height(&self, id: usize) -> f64 {
        self.distance_of(id) / 2.0
    }

    fn write_node(&self, id: usize, labels: &[String], out: &mut String) {
        match self.children(id) {
            None => out.push_str(&quote_label(&labels[id])),
            Some((left, right)) => {
                let height = self.height(id);
                out.push('(');
                self.write_node(left, labels, out);
                out.push_str(&branch_length(height - self.height(left)));
                out.push(',');
                self.write_node(right, labels, out);
                out.push_str(&branch_length(height - self.height(right)));
                out.push(')');
            }
        }
    }
}

fn branch_length(length: f64) -> String {
    format!(":{length:.6}")
}

fn quote_label(label: &str) -> String {
    let special = |c: char| c.is_whitespace() || "()[]':;,".contains(c);
    if label.chars().any(special) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{sanitize_for_clustering, DistanceMatrix};

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn ultrametric_branch_lengths() {
        #[rustfmt::skip]
        let values = vec![
            0.0, 2.0, 6.0,
            2.0, 0.0, 8.0,
            6.0, 8.0, 0.0,
        ];
        let names = labels(&["a", "b", "c"]);
        let matrix = DistanceMatrix::from_square(names.clone(), values).unwrap();
        let linkage = Linkage::average(&sanitize_for_clustering(&matrix)).unwrap();
        assert_eq!(
            linkage.to_newick(&names).unwrap(),
            "(c:3.500000,(a:1.000000,b:1.000000):2.500000);"
        );
    }

    #[test]
    fn quotes_awkward_labels() {
        assert_eq!(quote_label("E. coli"), "'E. coli'");
        assert_eq!(quote_label("o'brien"), "'o''brien'");
        assert_eq!(quote_label("GCF_000001"), "GCF_000001");
    }

    #[test]
    fn label_count_must_match() {
        let matrix = DistanceMatrix::from_square(labels(&["a", "b"]), vec![0.0, 1.0, 1.0, 0.0])
            .unwrap();
        let linkage = Linkage::average(&sanitize_for_clustering(&matrix)).unwrap();
        assert_eq!(
            linkage.to_newick(&labels(&["a"])).unwrap_err(),
            ClusterError::LabelMismatch { expected: 2, actual: 1 }
        );
    }
}
