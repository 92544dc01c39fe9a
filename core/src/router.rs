use std::fmt;

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Search,
    Favorites,
    ShoppingList,
    MealPlanner,
    RecipeDetail(i64),
}

impl Route {
    /// Parse a route token such as `/favorites` or `#/recipe/42`.
    /// Returns `None` for tokens that name no view.
    #[must_use]
    pub fn parse(token: &str) -> Option<Route> {
        let path = token.trim().trim_start_matches('#');
        let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
        match path {
            "" | "/" | "/search" => Some(Route::Search),
            "/favorites" => Some(Route::Favorites),
            "/shopping-list" => Some(Route::ShoppingList),
            "/meal-planner" => Some(Route::MealPlanner),
            _ => path
                .strip_prefix("/recipe/")
                .and_then(|id| id.parse::<i64>().ok())
                .filter(|id| *id > 0)
                .map(Route::RecipeDetail),
        }
    }

    /// Like [`Route::parse`], but a missing or unknown token lands on search.
    #[must_use]
    pub fn from_token(token: Option<&str>) -> Route {
        match token {
            None => Route::Search,
            Some(t) => Route::parse(t).unwrap_or_else(|| {
                warn!(token = t, "unknown route, showing search");
                Route::Search
            }),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Search => f.write_str("/search"),
            Route::Favorites => f.write_str("/favorites"),
            Route::ShoppingList => f.write_str("/shopping-list"),
            Route::MealPlanner => f.write_str("/meal-planner"),
            Route::RecipeDetail(id) => write!(f, "/recipe/{id}"),
        }
    }
}

/// Something the router can show. Handlers a view registers belong between
/// `activate` and `deactivate`.
pub trait View {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Loading(Route),
    Active(Route),
}

impl RouterState {
    #[must_use]
    pub fn route(self) -> Route {
        match self {
            RouterState::Loading(r) | RouterState::Active(r) => r,
        }
    }
}

/// Proof that a load was started for a route. Only the most recent ticket resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a load ticket must be resolved to show the view"]
pub struct LoadTicket {
    generation: u64,
    route: Route,
}

impl LoadTicket {
    pub fn route(&self) -> Route {
        self.route
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Activated(Route),
    /// A newer navigation superseded this load; the view was discarded.
    Stale(Route),
}

pub struct ViewRouter<V> {
    state: RouterState,
    generation: u64,
    active: Option<V>,
}

impl<V: View> ViewRouter<V> {
    /// A router already loading the route named by `token` (search when absent).
    pub fn start(token: Option<&str>) -> (Self, LoadTicket) {
        let route = Route::from_token(token);
        let router = Self {
            state: RouterState::Loading(route),
            generation: 0,
            active: None,
        };
        let ticket = LoadTicket {
            generation: 0,
            route,
        };
        (router, ticket)
    }

    /// Tear down whatever is showing and start loading `route`.
    pub fn navigate(&mut self, route: Route) -> LoadTicket {
        if let Some(mut view) = self.active.take() {
            view.deactivate();
        }
        self.generation += 1;
        debug!(from = %self.state.route(), to = %route, generation = self.generation, "navigate");
        self.state = RouterState::Loading(route);
        LoadTicket {
            generation: self.generation,
            route,
        }
    }

    /// Show the loaded view if its ticket is still current; otherwise drop it.
    pub fn resolve(&mut self, ticket: LoadTicket, mut view: V) -> Resolution {
        if ticket.generation != self.generation {
            debug!(route = %ticket.route, "discarding stale load");
            return Resolution::Stale(ticket.route);
        }
        if let Some(mut previous) = self.active.take() {
            previous.deactivate();
        }
        view.activate();
        self.active = Some(view);
        self.state = RouterState::Active(ticket.route);
        Resolution::Activated(ticket.route)
    }

    #[must_use]
    pub fn state(&self) -> RouterState {
        self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, RouterState::Loading(_))
    }

    #[must_use]
    pub fn active_view(&self) -> Option<&V> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Tracks live handler registrations across all views.
    struct TestView {
        name: &'static str,
        handlers: Rc<RefCell<Vec<&'static str>>>,
    }

    impl View for TestView {
        fn activate(&mut self) {
            self.handlers.borrow_mut().push(self.name);
        }

        fn deactivate(&mut self) {
            self.handlers.borrow_mut().retain(|h| *h != self.name);
        }
    }

    fn view(name: &'static str, handlers: &Rc<RefCell<Vec<&'static str>>>) -> TestView {
        TestView {
            name,
            handlers: handlers.clone(),
        }
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Route::parse("/"), Some(Route::Search));
        assert_eq!(Route::parse(""), Some(Route::Search));
        assert_eq!(Route::parse("/search"), Some(Route::Search));
        assert_eq!(Route::parse("#/favorites"), Some(Route::Favorites));
        assert_eq!(Route::parse("/shopping-list/"), Some(Route::ShoppingList));
        assert_eq!(Route::parse("/meal-planner"), Some(Route::MealPlanner));
        assert_eq!(
            Route::parse("#/recipe/716429"),
            Some(Route::RecipeDetail(716_429))
        );
        assert_eq!(Route::parse("/recipe/abc"), None);
        assert_eq!(Route::parse("/recipe/-4"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_display_round_trips() {
        for route in [
            Route::Search,
            Route::Favorites,
            Route::ShoppingList,
            Route::MealPlanner,
            Route::RecipeDetail(7),
        ] {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
    }

    #[test]
    fn test_start_defaults_to_search() {
        let (router, ticket) = ViewRouter::<TestView>::start(None);
        assert_eq!(router.state(), RouterState::Loading(Route::Search));
        assert_eq!(ticket.route(), Route::Search);

        let (router, _) = ViewRouter::<TestView>::start(Some("/bogus"));
        assert_eq!(router.state(), RouterState::Loading(Route::Search));
    }

    #[test]
    fn test_loading_then_active() {
        let handlers = Rc::new(RefCell::new(Vec::new()));
        let (mut router, ticket) = ViewRouter::start(Some("/favorites"));
        assert!(router.is_loading());
        assert!(router.active_view().is_none());

        let res = router.resolve(ticket, view("favorites", &handlers));
        assert_eq!(res, Resolution::Activated(Route::Favorites));
        assert_eq!(router.state(), RouterState::Active(Route::Favorites));
        assert_eq!(*handlers.borrow(), vec!["favorites"]);
    }

    #[test]
    fn test_navigation_tears_down_active_view() {
        let handlers = Rc::new(RefCell::new(Vec::new()));
        let (mut router, ticket) = ViewRouter::start(None);
        let _ = router.resolve(ticket, view("search", &handlers));

        let ticket = router.navigate(Route::MealPlanner);
        // Nothing is shown while loading.
        assert!(handlers.borrow().is_empty());
        assert!(router.active_view().is_none());
        assert_eq!(router.state(), RouterState::Loading(Route::MealPlanner));

        let _ = router.resolve(ticket, view("planner", &handlers));
        assert_eq!(*handlers.borrow(), vec!["planner"]);
    }

    #[test]
    fn test_late_stale_load_is_discarded() {
        let handlers = Rc::new(RefCell::new(Vec::new()));
        let (mut router, initial) = ViewRouter::start(None);
        let _ = router.resolve(initial, view("search", &handlers));

        let a = router.navigate(Route::RecipeDetail(1));
        let b = router.navigate(Route::Favorites);

        assert_eq!(
            router.resolve(b, view("favorites", &handlers)),
            Resolution::Activated(Route::Favorites)
        );
        assert_eq!(
            router.resolve(a, view("recipe-1", &handlers)),
            Resolution::Stale(Route::RecipeDetail(1))
        );
        assert_eq!(router.state(), RouterState::Active(Route::Favorites));
        assert_eq!(router.active_view().unwrap().name, "favorites");
        assert_eq!(*handlers.borrow(), vec!["favorites"]);
    }

    #[test]
    fn test_stale_load_resolving_first_is_discarded() {
        let handlers = Rc::new(RefCell::new(Vec::new()));
        let (mut router, _initial) = ViewRouter::start(None);
        let a = router.navigate(Route::ShoppingList);
        let b = router.navigate(Route::MealPlanner);

        assert_eq!(
            router.resolve(a, view("shopping", &handlers)),
            Resolution::Stale(Route::ShoppingList)
        );
        assert!(router.is_loading());
        let _ = router.resolve(b, view("planner", &handlers));
        assert_eq!(router.state(), RouterState::Active(Route::MealPlanner));
    }

    #[test]
    fn test_repeated_renders_do_not_accumulate_handlers() {
        let handlers = Rc::new(RefCell::new(Vec::new()));
        let (mut router, ticket) = ViewRouter::start(Some("/favorites"));
        let _ = router.resolve(ticket, view("favorites", &handlers));
        for _ in 0..5 {
            let t = router.navigate(Route::Favorites);
            let _ = router.resolve(t, view("favorites", &handlers));
        }
        assert_eq!(handlers.borrow().len(), 1);
    }
}
