//! Profile tab entries

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTarget {
    MyReports,
    SavedResources,
    CounselorConnect,
    Settings,
    AccountInfo,
    Logout,
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileOption {
    pub icon: &'static str,
    pub title: &'static str,
    pub target: ProfileTarget,
}

pub const PROFILE_OPTIONS: &[ProfileOption] = &[
    ProfileOption {
        icon: "📄",
        title: "My Reports",
        target: ProfileTarget::MyReports,
    },
    ProfileOption {
        icon: "🔖",
        title: "Saved Resources / Awareness",
        target: ProfileTarget::SavedResources,
    },
    ProfileOption {
        icon: "🤝",
        title: "Counselor / Help Connect",
        target: ProfileTarget::CounselorConnect,
    },
    ProfileOption {
        icon: "⚙",
        title: "Settings",
        target: ProfileTarget::Settings,
    },
    ProfileOption {
        icon: "👤",
        title: "Account Info",
        target: ProfileTarget::AccountInfo,
    },
    ProfileOption {
        icon: "←",
        title: "Logout / Exit",
        target: ProfileTarget::Logout,
    },
];
