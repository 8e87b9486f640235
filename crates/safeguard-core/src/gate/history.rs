/// Screens of the authenticated tab tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Alerts,
    Map,
    Sensors,
    Readings,
    Risks,
    Stations,
    Settings,
    Instructions,
}

impl Screen {
    /// Tab order
    pub const ALL: [Screen; 8] = [
        Screen::Alerts,
        Screen::Map,
        Screen::Sensors,
        Screen::Readings,
        Screen::Risks,
        Screen::Stations,
        Screen::Settings,
        Screen::Instructions,
    ];

    /// Get the display title for this screen.
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Alerts => "Alerts",
            Screen::Map => "Map",
            Screen::Sensors => "Sensors",
            Screen::Readings => "Readings",
            Screen::Risks => "Risks",
            Screen::Stations => "Stations",
            Screen::Settings => "Settings",
            Screen::Instructions => "Help",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Get the next screen (wrapping around)
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Get the previous screen (wrapping around)
    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Screen for a 1-based tab number
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Where the user is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Authentication state not yet known
    Loading,
    Login,
    Tab(Screen),
    /// Sensors attached to one station, over the map
    StationDetail { station_id: i64 },
}

impl Route {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Route::Tab(_) | Route::StationDetail { .. })
    }

    /// The tab this route belongs to
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Route::Tab(screen) => Some(*screen),
            Route::StationDetail { .. } => Some(Screen::Map),
            Route::Loading | Route::Login => None,
        }
    }
}

/// Back stack. Never empty.
#[derive(Debug, Clone)]
pub struct NavigationHistory {
    stack: Vec<Route>,
}

impl NavigationHistory {
    pub fn new(root: Route) -> Self {
        Self { stack: vec![root] }
    }

    /// Drop all history and start over at `root`
    pub fn reset(&mut self, root: Route) {
        self.stack.clear();
        self.stack.push(root);
    }

    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(Route::Loading)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, route: Route) {
        self.stack.push(route);
    }

    /// Switch tabs. Tabs are siblings, so this replaces the whole stack.
    pub fn switch_tab(&mut self, screen: Screen) {
        self.reset(Route::Tab(screen));
    }

    /// Pop one entry. The root is never popped.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn contains(&self, pred: impl Fn(&Route) -> bool) -> bool {
        self.stack.iter().any(pred)
    }
}
