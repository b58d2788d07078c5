use serde::Deserialize;
use thiserror::Error;

fn default_billing_note() -> String {
    "Billed monthly • Cancel anytime".to_string()
}

/// A subscription package as shown on a card. Read-only once loaded.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Package {
    pub name: String,
    pub price: String,
    pub period: String,
    pub features: Vec<String>,
    pub cta: String,
    pub payment_link: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default = "default_billing_note")]
    pub billing_note: String,
}

impl Package {
    pub fn headline(&self) -> String {
        format!("{} • {}{}", self.name, self.price, self.period)
    }

    /// Ribbon above the card. Featured packages always win over a custom badge.
    pub fn ribbon(&self) -> Option<String> {
        if self.featured {
            Some("⭐ Most Popular".to_string())
        } else {
            self.badge.clone()
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse package catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("package catalog is empty")]
    Empty,

    #[error("package '{0}' has no payment link")]
    MissingPaymentLink(String),
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Catalog {
    packages: Vec<Package>,
}

impl Catalog {
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        if catalog.packages.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(pkg) = catalog
            .packages
            .iter()
            .find(|p| p.payment_link.trim().is_empty())
        {
            return Err(CatalogError::MissingPaymentLink(pkg.name.clone()));
        }
        Ok(catalog)
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn find(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"{
        "packages": [
            {
                "name": "Essential Support",
                "price": "$499",
                "period": "/month",
                "features": ["Weekly check-in", "Email support"],
                "cta": "Get Started",
                "payment_link": "https://buy.example.com/essential"
            },
            {
                "name": "Value-Based Support",
                "price": "$999",
                "period": "/month",
                "features": ["Everything in Essential"],
                "cta": "Choose Value",
                "payment_link": "https://buy.example.com/value",
                "badge": "✨ Limited Time Only"
            },
            {
                "name": "Growth Partnership",
                "price": "$1,999",
                "period": "/month",
                "features": [],
                "cta": "Partner With Us",
                "payment_link": "https://buy.example.com/growth",
                "featured": true,
                "badge": "ignored when featured"
            }
        ]
    }"#;

    #[test]
    fn parses_catalog_with_defaults() {
        let catalog = Catalog::from_json(RAW).unwrap();
        assert_eq!(catalog.packages().len(), 3);

        let essential = catalog.find("Essential Support").unwrap();
        assert!(!essential.featured);
        assert_eq!(essential.badge, None);
        assert_eq!(essential.billing_note, "Billed monthly • Cancel anytime");
        assert_eq!(essential.headline(), "Essential Support • $499/month");
    }

    #[test]
    fn ribbon_prefers_featured_over_badge() {
        let catalog = Catalog::from_json(RAW).unwrap();
        assert_eq!(catalog.find("Essential Support").unwrap().ribbon(), None);
        assert_eq!(
            catalog.find("Value-Based Support").unwrap().ribbon().as_deref(),
            Some("✨ Limited Time Only")
        );
        assert_eq!(
            catalog.find("Growth Partnership").unwrap().ribbon().as_deref(),
            Some("⭐ Most Popular")
        );
    }

    #[test]
    fn find_unknown_package() {
        let catalog = Catalog::from_json(RAW).unwrap();
        assert!(catalog.find("Enterprise").is_none());
    }

    #[test]
    fn rejects_bad_catalogs() {
        assert!(matches!(
            Catalog::from_json(r#"{"packages": []}"#),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            Catalog::from_json("not json"),
            Err(CatalogError::Parse(_))
        ));

        let missing_link = r#"{"packages": [{
            "name": "Broken", "price": "$1", "period": "/month",
            "features": [], "cta": "Buy", "payment_link": "  "
        }]}"#;
        match Catalog::from_json(missing_link) {
            Err(CatalogError::MissingPaymentLink(name)) => assert_eq!(name, "Broken"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
