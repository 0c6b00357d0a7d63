pub mod roles {

    pub const ADMIN: &str = "admin";

    pub const USER: &str = "user";
}

pub mod permissions {

    pub const VIEW_PROFILE: &str = "view_profile";

    pub const EDIT_PROFILE: &str = "edit_profile";

    /// Permissions created by the bootstrap routine. `admin` receives all of them.
    pub const BASIC: &[&str] = &[
        VIEW_PROFILE,
        EDIT_PROFILE,
        "view_users",
        "create_user",
        "edit_user",
        "delete_user",
        "manage_roles",
        "manage_permissions",
    ];

    /// Subset granted to the `user` role.
    pub const USER_DEFAULTS: &[&str] = &[VIEW_PROFILE, EDIT_PROFILE];
}

pub mod auth {
    use std::time::Duration;

    pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    pub const DEFAULT_JWT_SECRET: &str = "your_default_secret_key";

    pub const MIN_PASSWORD_LEN: usize = 6;
}

pub mod limits {

    pub const MAX_NAME_LEN: usize = 100;

    pub const MAX_EMAIL_LEN: usize = 254;
}
