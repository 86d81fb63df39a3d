// region:    --- Users

pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash)
    VALUES ($1, $2, $3)
    RETURNING id, username, email, created_at
"#;

pub const FIND_CREDENTIALS: &str =
    "SELECT id, username, password_hash FROM users WHERE username = $1";

pub const GET_USER: &str = "SELECT id, username, email, created_at FROM users WHERE id = $1";

// endregion: --- Users

// region:    --- Listings

pub const INSERT_LISTING: &str = r#"
    INSERT INTO listings (creator_id, title, description, starting_price, image_url, category)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

pub const GET_LISTING: &str = "SELECT * FROM listings WHERE id = $1";

/// Row lock so concurrent bids and closes on one listing run one at a time.
pub const LOCK_LISTING: &str = "SELECT * FROM listings WHERE id = $1 FOR UPDATE";

pub const ACTIVE_LISTINGS: &str = r#"
    SELECT l.*, MAX(b.amount) AS highest_bid
    FROM listings l
    LEFT JOIN bids b ON b.listing_id = l.id
    WHERE l.active
    GROUP BY l.id
    ORDER BY l.id
"#;

pub const LISTINGS_IN_CATEGORY: &str = r#"
    SELECT l.*, MAX(b.amount) AS highest_bid
    FROM listings l
    LEFT JOIN bids b ON b.listing_id = l.id
    WHERE l.active AND l.category = $1
    GROUP BY l.id
    ORDER BY l.id
"#;

pub const ACTIVE_CATEGORIES: &str = r#"
    SELECT DISTINCT category
    FROM listings
    WHERE active AND category IS NOT NULL
    ORDER BY category
"#;

pub const WATCHED_LISTINGS: &str = r#"
    SELECT l.*, MAX(b.amount) AS highest_bid
    FROM listings l
    JOIN watchlist w ON w.listing_id = l.id
    LEFT JOIN bids b ON b.listing_id = l.id
    WHERE w.user_id = $1
    GROUP BY l.id
    ORDER BY l.id
"#;

/// Winner is only written when there is one.
pub const CLOSE_LISTING: &str = r#"
    UPDATE listings
    SET active = FALSE, winner_id = COALESCE($2, winner_id)
    WHERE id = $1
    RETURNING *
"#;

// endregion: --- Listings

// region:    --- Bids

pub const BID_SUMMARY: &str = r#"
    SELECT MAX(amount) AS highest_bid, COUNT(*) AS num_bids
    FROM bids
    WHERE listing_id = $1
"#;

pub const HIGHEST_BID: &str = "SELECT MAX(amount) FROM bids WHERE listing_id = $1";

pub const BIDS_FOR_LISTING: &str = r#"
    SELECT id, listing_id, bidder_id, amount, placed_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY placed_at, id
"#;

// clock_timestamp() is read after the listing lock is held, so it follows acceptance order.
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, amount, placed_at)
    VALUES ($1, $2, $3, clock_timestamp())
    RETURNING id, listing_id, bidder_id, amount, placed_at
"#;

// endregion: --- Bids

// region:    --- Comments

pub const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (listing_id, commenter_id, content)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, commenter_id, content, posted_at
"#;

pub const COMMENTS_FOR_LISTING: &str = r#"
    SELECT c.id, c.listing_id, c.commenter_id, u.username AS commenter, c.content, c.posted_at
    FROM comments c
    JOIN users u ON u.id = c.commenter_id
    WHERE c.listing_id = $1
    ORDER BY c.posted_at, c.id
"#;

// endregion: --- Comments

// region:    --- Watchlist

pub const IS_WATCHING: &str =
    "SELECT EXISTS(SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2)";

pub const REMOVE_FROM_WATCHLIST: &str =
    "DELETE FROM watchlist WHERE user_id = $1 AND listing_id = $2";

pub const ADD_TO_WATCHLIST: &str =
    "INSERT INTO watchlist (user_id, listing_id) VALUES ($1, $2) ON CONFLICT DO NOTHING";

// endregion: --- Watchlist
