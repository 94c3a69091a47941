/// Pipeline phase a progress message belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressPhase {
    Scanning,
    Linking,
}

#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        current: usize,
        file: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
}
