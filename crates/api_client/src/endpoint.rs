use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

/// Every API resource the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SessionCheck,
    Logout,
    Budget,
    Subscriptions,
    DailySpending,
    Categories,
    Goals,
    BankStatus,
    BankConnect,
    BankDisconnect,
}

impl Endpoint {
    /// Path relative to the API base URL. The session check path can be
    /// overridden by configuration.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SessionCheck => "auth/me",
            Endpoint::Logout => "auth/logout",
            Endpoint::Budget => "budget",
            Endpoint::Subscriptions => "subscriptions",
            Endpoint::DailySpending => "spending/daily",
            Endpoint::Categories => "spending/categories",
            Endpoint::Goals => "goals",
            Endpoint::BankStatus => "plaid/status",
            Endpoint::BankConnect => "plaid/connect",
            Endpoint::BankDisconnect => "plaid/disconnect",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
