//! Where every scraped field lives on the game's pages
//!
//! The pricing page has no stable ids for its figures, so they are read by
//! position: the Nth element (in document order) below the pricing
//! container. Any upstream markup change silently shifts these positions.
//! That fragility is accepted; keeping every selector and index here makes a
//! layout change a one-line fix.

/// Descendant positions of the four buckets of one figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSlots {
    pub economic: usize,
    pub executive: usize,
    pub first_class: usize,
    pub cargo: usize,
}

/// `/marketing/pricing/{id}`
pub mod pricing {
    use super::BucketSlots;

    pub const CONTAINER: &str = "div#marketing_linePricing";

    pub const IDEAL_COST: BucketSlots = BucketSlots {
        economic: 15,
        executive: 23,
        first_class: 31,
        cargo: 39,
    };
    pub const TOTAL_DEMAND: BucketSlots = BucketSlots {
        economic: 17,
        executive: 25,
        first_class: 33,
        cargo: 41,
    };
    pub const TURNOVER: BucketSlots = BucketSlots {
        economic: 19,
        executive: 27,
        first_class: 35,
        cargo: 43,
    };
    pub const CURRENT_COST: BucketSlots = BucketSlots {
        economic: 62,
        executive: 71,
        first_class: 80,
        cargo: 89,
    };

    pub const LAST_AUDIT_DATE: usize = 47;
    pub const AUDIT_DATE_FORMAT: &str = "%d/%m/%Y";

    /// Element whose second class token carries the level, e.g. `level70`
    pub const RELIABILITY: usize = 54;

    pub const AUDIT_COST_INPUT: &str = "input#internalAuditCost";
    pub const PRICE_FORM: &str = "form";
    pub const PRICE_TOKEN_INPUT: &str = "input#line__token";

    pub const ECONOMIC_FIELD: &str = "line[priceEco]";
    pub const EXECUTIVE_FIELD: &str = "line[priceBus]";
    pub const FIRST_CLASS_FIELD: &str = "line[priceFirst]";
    pub const CARGO_FIELD: &str = "line[priceCargo]";
    pub const TOKEN_FIELD: &str = "line[_token]";
}

/// `/network/showline/{id}`
pub mod detail {
    pub const CONTAINER: &str = "div#content";
    pub const ORIGIN_BOX: &str = "ul#box1";
    pub const DESTINATION_BOX: &str = "ul#box2";
    pub const ITEM: &str = "li";
    pub const VALUE: &str = "b";

    /// Item index within the origin box
    pub const ORIGIN_ITEM: usize = 3;
    /// Item indexes within the destination box
    pub const DISTANCE_ITEM: usize = 1;
    pub const TAXES_ITEM: usize = 2;
    pub const DESTINATION_ITEM: usize = 3;

    pub const TITLE: &str = "div.lineTitle";
    /// Decoration inside the title that is not part of the name
    pub const TITLE_BADGE: &str = "span";
}

/// `/login`
pub mod login {
    pub const CSRF_INPUT: &str = "input[name=\"_csrf_token\"]";
}

/// Paginated listings
pub mod listing {
    pub const PAGINATION: &str = "div.pagination";
    pub const NEXT_MARKER: &str = "span.next";
    pub const ROW: &str = "tr";
    pub const HEADER_CELL: &str = "th";
    pub const CELL: &str = "td";

    pub const LINES_CONTAINER: &str = "div#displayPro";
    pub const LINES_TABLE: &str = "table";
    /// The lines table is the second table inside its container
    pub const LINES_TABLE_INDEX: usize = 1;
    /// Cell holding the link to the line detail page
    pub const LINES_LINK_CELL: usize = 6;

    pub const AIRPLANES_TABLE: &str = "table.aircraftListViewTable";
    pub const AIRPLANE_NAME: &str = "span.editAircraftName";
    pub const AIRPLANE_MODEL_IMAGE: &str = "img.zoomAircraft";
}

/// Bonus pages
pub mod bonus {
    pub const HOME_CONTENT: &str = "div#mainContent";
    pub const WHEEL_BANNER: &str = "div#playWheel";

    pub const CARD_HOLDER_TITLE: &str = "div.cardholder-title";
    pub const CARD_HOLDER_TIMER: &str = "div#timerFree";
    pub const CARD_FORM_TOKEN: &str = "input#form__token";
    pub const CARD_FORM_ID: &str = "input#form_id";
    pub const CARD_BONUS_CONTAINER: &str = "div#bonusCards-container";
    pub const CARD_BONUS: &str = "div.showCards-card.front-card";
    pub const CARD_BONUS_TITLE: &str = "div.front-side-title.textFill";

    pub const WORKSHOP_RACK: &str = "div.rack";
    pub const WORKSHOP_ITEM: &str = "div.object";
    pub const WORKSHOP_PURCHASE: &str = "a.purchaseButton.useAjax";
}
