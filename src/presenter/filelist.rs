// Cached-file list: case-insensitive path filter, zebra striping, pagination.

use serde::Serialize;

use crate::models::ScriptView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zebra {
    Even,
    Odd,
}

impl Zebra {
    fn at(index: usize) -> Self {
        if index % 2 == 0 { Zebra::Even } else { Zebra::Odd }
    }

    pub fn class(self) -> &'static str {
        match self {
            Zebra::Even => "even",
            Zebra::Odd => "odd",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRow<'a> {
    pub script: &'a ScriptView,
    pub zebra: Zebra,
}

/// One rendered page of the (filtered) file list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage<'a> {
    pub rows: Vec<FileRow<'a>>,
    /// Scripts matching the filter across all pages.
    pub matching: usize,
    pub total: usize,
    /// 1-based, clamped to `1..=pages`.
    pub page: usize,
    pub pages: usize,
    pub filtered: bool,
}

/// Scripts whose normalized path contains `filter` (case-insensitive), in list order.
pub fn filter_scripts<'a>(scripts: &'a [ScriptView], filter: &str) -> Vec<&'a ScriptView> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return scripts.iter().collect();
    }
    scripts
        .iter()
        .filter(|s| s.full_path.to_lowercase().contains(&needle))
        .collect()
}

/// Number of pages for `count` rows; at least one, and one when `per_page` is 0 (unpaginated).
pub fn page_count(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        1
    } else {
        count.div_ceil(per_page).max(1)
    }
}

pub fn file_page<'a>(
    scripts: &'a [ScriptView],
    filter: &str,
    page: usize,
    per_page: usize,
) -> FilePage<'a> {
    let matching = filter_scripts(scripts, filter);
    let pages = page_count(matching.len(), per_page);
    let page = page.clamp(1, pages);
    let visible: Vec<&ScriptView> = if per_page == 0 {
        matching.clone()
    } else {
        matching
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .copied()
            .collect()
    };
    FilePage {
        rows: visible
            .into_iter()
            .enumerate()
            .map(|(i, script)| FileRow {
                script,
                zebra: Zebra::at(i),
            })
            .collect(),
        matching: matching.len(),
        total: scripts.len(),
        page,
        pages,
        filtered: !filter.trim().is_empty(),
    }
}
