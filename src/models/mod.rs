// Snapshot models: raw collaborator payload and the normalized view model

mod raw;
mod view;

pub use raw::{
    RawDirective, RawInternedStrings, RawJit, RawMemory, RawPreload, RawScript, RawSnapshot,
    RawStatistics, RawStatus, RawVersion,
};
pub use view::{
    DirectiveValue, DirectiveView, Formatted, Highlight, InternedStringsView, JitView, MemoryView,
    OverviewView, PreloadView, Presence, ScriptView, StatisticsView, ViewModel,
};
