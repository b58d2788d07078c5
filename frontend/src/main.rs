use yew::prelude::*;
use yew_router::prelude::*;
use log::info;

mod config;
mod packages {
    pub mod models;
    pub mod gate;
    pub mod flow;
    pub mod session;
    #[cfg(test)]
    pub mod testing;
}
mod components {
    pub mod agreement;
    pub mod package_card;
    pub mod terms_acceptance;
}
mod pages {
    pub mod packages;
}

use pages::packages::{NotFound, Packages};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Packages,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Packages => {
            info!("Rendering Packages page");
            html! { <Packages /> }
        },
        Route::NotFound => {
            info!("Rendering NotFound page");
            html! { <NotFound /> }
        },
    }
}

#[function_component]
fn App() -> Html {
    html! {
        <BrowserRouter>
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
