//! Operator commands handled locally instead of being sent as chat.

/// A line starting with one of these words never reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    /// `/servidores`, `/servers`
    Servers,
    /// `/ayuda`, `/help`
    Help,
    /// `/salir`, `/quit`
    Quit,
}

impl LocalCommand {
    /// Match a whole input line, ignoring case and surrounding whitespace.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "/servidores" | "/servers" => Some(Self::Servers),
            "/ayuda" | "/help" => Some(Self::Help),
            "/salir" | "/quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Command summary shown for [`LocalCommand::Help`].
pub const HELP_LINES: &[(&str, &str)] = &[
    ("/servidores", "Muestra lista de servidores"),
    ("/ayuda", "Muestra esta ayuda"),
    ("/salir", "Salir del chat"),
];
