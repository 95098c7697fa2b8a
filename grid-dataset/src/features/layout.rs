use crate::common::*;
use strum::{Display, IntoStaticStr};

/// The columns preceding every feature vector in the feature table.
pub const LEADING_COLUMNS: [&str; 3] = ["ImageName", "CellIndex", "Label"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
pub enum FeatureGroupKind {
    Hog,
    Color,
    Texture,
    Shape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGroup {
    pub kind: FeatureGroupKind,
    pub columns: Vec<String>,
}

/// Ordered, named feature columns for one configuration and cell size.
///
/// The layout is fixed for a run. Every row written under it carries exactly
/// [`FeatureLayout::len`] feature values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    groups: Vec<FeatureGroup>,
}

impl FeatureLayout {
    pub fn new(groups: Vec<FeatureGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.columns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn group_len(&self, kind: FeatureGroupKind) -> usize {
        self.groups
            .iter()
            .filter(|group| group.kind == kind)
            .map(|group| group.columns.len())
            .sum()
    }

    /// Number of columns per group, in column order.
    pub fn group_sizes(&self) -> IndexMap<FeatureGroupKind, usize> {
        self.groups
            .iter()
            .map(|group| (group.kind, group.columns.len()))
            .collect()
    }

    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|group| group.columns.iter().map(|name| name.as_str()))
    }

    /// The full table header including the leading identification columns.
    pub fn header(&self) -> Vec<String> {
        LEADING_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .chain(self.feature_columns().map(|name| name.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(kind: FeatureGroupKind, prefix: &str, len: usize) -> FeatureGroup {
        FeatureGroup {
            kind,
            columns: (0..len).map(|i| format!("{}_{}", prefix, i)).collect(),
        }
    }

    #[test]
    fn header_starts_with_leading_columns() {
        let layout = FeatureLayout::new(vec![
            group(FeatureGroupKind::Hog, "HOG", 2),
            group(FeatureGroupKind::Color, "Color", 3),
        ]);
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.group_len(FeatureGroupKind::Color), 3);
        assert_eq!(layout.group_len(FeatureGroupKind::Shape), 0);
        assert_eq!(
            layout.header(),
            vec!["ImageName", "CellIndex", "Label", "HOG_0", "HOG_1", "Color_0", "Color_1", "Color_2"]
        );
        assert_eq!(
            layout.group_sizes().into_iter().collect::<Vec<_>>(),
            vec![(FeatureGroupKind::Hog, 2), (FeatureGroupKind::Color, 3)]
        );
    }
}
