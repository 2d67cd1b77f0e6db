/// The rendered Markdown views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    NextActions,
    Projects,
    Someday,
    WaitingFor,
    Agenda,
    StalledProjects,
}

impl ViewKind {
    /// Every view, in the order build writes them
    pub const ALL: [ViewKind; 6] = [
        ViewKind::NextActions,
        ViewKind::Projects,
        ViewKind::Someday,
        ViewKind::WaitingFor,
        ViewKind::Agenda,
        ViewKind::StalledProjects,
    ];

    /// The views sync reads, in order. A later file overrides an earlier one
    /// when the same id shows up in both. `stalled_projects.md` is left out:
    /// it repeats lines from `projects.md` and would undo an `XXX` there.
    pub const SYNC_ORDER: [ViewKind; 5] = [
        ViewKind::NextActions,
        ViewKind::Projects,
        ViewKind::Someday,
        ViewKind::WaitingFor,
        ViewKind::Agenda,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ViewKind::NextActions => "next_actions.md",
            ViewKind::Projects => "projects.md",
            ViewKind::Someday => "someday.md",
            ViewKind::WaitingFor => "waiting_for.md",
            ViewKind::Agenda => "agenda.md",
            ViewKind::StalledProjects => "stalled_projects.md",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::NextActions => "Next Actions",
            ViewKind::Projects => "Projects",
            ViewKind::Someday => "Someday / Maybe",
            ViewKind::WaitingFor => "Waiting For",
            ViewKind::Agenda => "Agenda",
            ViewKind::StalledProjects => "Stalled Projects",
        }
    }

    /// Sentence shown when the view has nothing in it
    pub fn placeholder(self) -> &'static str {
        match self {
            ViewKind::NextActions => "_No active actions._",
            ViewKind::Projects => "_No active projects._",
            ViewKind::Someday => "_Nothing on the someday list._",
            ViewKind::WaitingFor => "_Not waiting on anything._",
            ViewKind::Agenda => "_No agenda items._",
            ViewKind::StalledProjects => "_No stalled projects._",
        }
    }

    /// Header written by `gtd init` before the first build
    pub fn starter(self) -> String {
        format!("# {}\n", self.title())
    }
}
