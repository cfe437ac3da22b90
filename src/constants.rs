/// Reserved section holding one JSON image record per field.
pub const IMAGES_SECTION: &str = "images";

pub mod auth {

    pub const ADMIN_ROLE: &str = "admin";
}

pub mod export {

    pub const FORMAT_VERSION: &str = "1.0.0";

    pub const FILENAME: &str = "website-content-export.json";
}

pub mod limits {

    pub const RECENT_UPDATES: u64 = 10;

    pub const MIN_SEARCH_QUERY_CHARS: usize = 2;

    pub const MAX_KEY_LENGTH: usize = 100;
}

/// Placeholder copy written by `brewpress init` into an empty store.
pub const DEFAULT_CONTENT: &[(&str, &str, &str)] = &[
    ("hero", "heading", "Artisan Coffee Roasting"),
    (
        "hero",
        "subtitle",
        "Small batch, handcrafted coffee roasted with care",
    ),
    ("hero", "button", "Explore Our Coffee"),
    ("about", "title", "Our Story"),
    (
        "about",
        "story1",
        "We started with a small home roaster and a lot of curiosity.",
    ),
    (
        "about",
        "story2",
        "Every batch is roasted in small quantities and tasted before it ships.",
    ),
    ("features", "feature1_title", "Small Batch"),
    (
        "features",
        "feature1_desc",
        "Roasted in small batches for consistency in every cup.",
    ),
    ("features", "feature2_title", "Fresh Roasted"),
    (
        "features",
        "feature2_desc",
        "Shipped within 24 hours of roasting.",
    ),
    ("features", "feature3_title", "Local Business"),
    (
        "features",
        "feature3_desc",
        "Serving our community with personal attention.",
    ),
    ("coffee", "light_roast_title", "Light Roast"),
    ("coffee", "light_roast_price", "$16.99"),
    ("coffee", "medium_roast_title", "Medium Roast"),
    ("coffee", "medium_roast_price", "$17.99"),
    ("coffee", "dark_roast_title", "Dark Roast"),
    ("coffee", "dark_roast_price", "$18.99"),
    ("contact", "address", "123 Main Street"),
    ("contact", "phone", "(555) 555-0123"),
    ("contact", "email", "info@example.com"),
    ("contact", "hours1", "Monday - Friday: 7:00 AM - 6:00 PM"),
    ("contact", "hours2", "Saturday: 8:00 AM - 4:00 PM"),
    ("contact", "hours3", "Sunday: Closed"),
    ("settings", "website_title", "Artisan Coffee Roasting"),
    ("settings", "company_name", "Example Roasters"),
];
