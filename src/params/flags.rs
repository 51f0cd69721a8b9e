/// validation toggles for one scalar parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamFlags {
    pub mandatory: bool,
    pub not_empty: bool,
    /// value must start with `/`
    pub absolute_path: bool,
    pub no_wildcards: bool,
    /// value must look like `user@host`
    pub mail: bool,
    pub remove_final_slash: bool,
    /// `stdout`, `stderr` and `syslog` are accepted as-is
    pub stdio_allowed: bool,
    /// numeric value must be >= 0
    pub positive: bool,
    /// numeric value must be != 0
    pub not_null: bool,
    /// float value may end with `%`
    pub allow_pct_sign: bool,
}

impl ParamFlags {
    pub const NONE: ParamFlags = ParamFlags {
        mandatory: false,
        not_empty: false,
        absolute_path: false,
        no_wildcards: false,
        mail: false,
        remove_final_slash: false,
        stdio_allowed: false,
        positive: false,
        not_null: false,
        allow_pct_sign: false,
    };

    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub const fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    pub const fn absolute_path(mut self) -> Self {
        self.absolute_path = true;
        self
    }

    pub const fn no_wildcards(mut self) -> Self {
        self.no_wildcards = true;
        self
    }

    pub const fn mail(mut self) -> Self {
        self.mail = true;
        self
    }

    pub const fn remove_final_slash(mut self) -> Self {
        self.remove_final_slash = true;
        self
    }

    pub const fn stdio_allowed(mut self) -> Self {
        self.stdio_allowed = true;
        self
    }

    pub const fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub const fn allow_pct_sign(mut self) -> Self {
        self.allow_pct_sign = true;
        self
    }
}
