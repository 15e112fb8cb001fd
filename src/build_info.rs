use std::fmt;

/// Build metadata captured at compile time
///
/// Release builds populate the optional fields through the `JDCLI_REVISION`,
/// `JDCLI_BRANCH`, `JDCLI_BUILD_USER`, `JDCLI_BUILD_DATE` and
/// `JDCLI_RUSTC_VERSION` environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: Option<&'static str>,
    pub branch: Option<&'static str>,
    pub build_user: Option<&'static str>,
    pub build_date: Option<&'static str>,
    pub rustc_version: Option<&'static str>,
    pub os: &'static str,
    pub arch: &'static str,
}

impl BuildInfo {
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            revision: option_env!("JDCLI_REVISION"),
            branch: option_env!("JDCLI_BRANCH"),
            build_user: option_env!("JDCLI_BUILD_USER"),
            build_date: option_env!("JDCLI_BUILD_DATE"),
            rustc_version: option_env!("JDCLI_RUSTC_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = "unknown";
        writeln!(f, "Version:    {}", self.version)?;
        writeln!(f, "Revision:   {}", self.revision.unwrap_or(unknown))?;
        writeln!(f, "Branch:     {}", self.branch.unwrap_or(unknown))?;
        writeln!(f, "Build user: {}", self.build_user.unwrap_or(unknown))?;
        writeln!(f, "Build date: {}", self.build_date.unwrap_or(unknown))?;
        writeln!(f, "Rustc:      {}", self.rustc_version.unwrap_or(unknown))?;
        write!(f, "Platform:   {}/{}", self.os, self.arch)
    }
}
