use log::warn;
use yew::prelude::*;

use crate::components::package_card::PackageCard;
use crate::config;

#[function_component(Packages)]
pub fn packages() -> Html {
    let catalog = use_memo(|_| config::package_catalog(), ());

    let body = match &*catalog {
        Ok(catalog) => html! {
            <div class="packages-grid">
                {
                    catalog.packages().iter().enumerate().map(|(index, pkg)| html! {
                        <PackageCard key={pkg.name.clone()} pkg={pkg.clone()} {index} />
                    }).collect::<Html>()
                }
            </div>
        },
        Err(e) => {
            warn!("Could not load packages: {}", e);
            html! {
                <div class="packages-error">
                    {"Our packages are unavailable right now. Please try again later."}
                </div>
            }
        }
    };

    html! {
        <div class="packages-container">
            <div class="packages-header">
                <h1>{"Choose Your Support Package"}</h1>
                <p>{"Every plan starts with a quick review of our service agreement."}</p>
            </div>
            {body}
            <style>
                {r#"
                .packages-container {
                    padding: 6rem 1rem 4rem;
                    max-width: 72rem;
                    margin: 0 auto;
                    color: #fff;
                }
                .packages-header {
                    text-align: center;
                    margin-bottom: 3rem;
                }
                .packages-grid {
                    display: grid;
                    grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
                    gap: 2rem;
                }
                .packages-error {
                    text-align: center;
                    color: #ff6b6b;
                }
                "#}
            </style>
        </div>
    }
}

#[function_component(NotFound)]
pub fn not_found() -> Html {
    html! {
        <div class="packages-container">
            <h1>{"Page not found"}</h1>
        </div>
    }
}
