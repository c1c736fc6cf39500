/// SQL schema for the Kisan Doctor database
/// Every statement is idempotent so it can run on each startup
pub const SCHEMA: &str = r#"
-- Users table (phone is the login identity)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    phone TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    password_hash TEXT,
    join_date TEXT NOT NULL
);

-- Community posts
CREATE TABLE IF NOT EXISTS community_posts (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL,
    content TEXT NOT NULL,
    tag TEXT NOT NULL DEFAULT 'General',
    created_at TEXT NOT NULL,
    image BLOB,
    image_content_type TEXT,
    like_count INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_community_posts_created_at ON community_posts(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_community_posts_tag ON community_posts(tag);

-- Comments on community posts
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (post_id) REFERENCES community_posts(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);

-- Likes (one per user per post)
CREATE TABLE IF NOT EXISTS likes (
    post_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (post_id, user_id),
    FOREIGN KEY (post_id) REFERENCES community_posts(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Marketplace listings
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    seller_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL,
    location TEXT NOT NULL DEFAULT '',
    contact TEXT NOT NULL,
    image BLOB,
    image_content_type TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (seller_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at DESC);

-- Schemes directory (reference data)
CREATE TABLE IF NOT EXISTS schemes (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    description TEXT NOT NULL,
    eligibility TEXT NOT NULL,
    kind TEXT NOT NULL CHECK(kind IN ('government', 'private')),
    link TEXT NOT NULL
);

-- Mandi prices (reference data)
CREATE TABLE IF NOT EXISTS market_prices (
    id INTEGER PRIMARY KEY,
    market TEXT NOT NULL,
    crop TEXT NOT NULL,
    variety TEXT NOT NULL,
    min_price INTEGER NOT NULL,
    max_price INTEGER NOT NULL,
    modal_price INTEGER NOT NULL,
    price_date TEXT NOT NULL,
    UNIQUE (market, crop, variety, price_date)
);

CREATE INDEX IF NOT EXISTS idx_market_prices_market ON market_prices(market);

-- Sessions
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

-- Assistant chat history
CREATE TABLE IF NOT EXISTS chat_messages (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK(role IN ('user', 'assistant')),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_chat_messages_user_id ON chat_messages(user_id);
"#;

/// Reference data for the schemes directory and the price tables
pub const SEED_DATA: &str = r#"
-- ============================================================================
-- SCHEMES
-- ============================================================================
INSERT OR IGNORE INTO schemes (name, description, eligibility, kind, link) VALUES
    ('PM-KISAN', 'Income support of Rs 6,000 per year paid in three equal instalments.', 'All landholding farmer families', 'government', 'https://pmkisan.gov.in'),
    ('Pradhan Mantri Fasal Bima Yojana', 'Crop insurance against natural calamities, pests and diseases.', 'Farmers growing notified crops in notified areas', 'government', 'https://pmfby.gov.in'),
    ('Kisan Credit Card', 'Short-term credit for cultivation and allied activities at concessional interest.', 'Owner cultivators, tenant farmers and sharecroppers', 'government', 'https://www.myscheme.gov.in/schemes/kcc'),
    ('Soil Health Card', 'Free soil testing with crop-wise nutrient recommendations.', 'All farmers', 'government', 'https://soilhealth.dac.gov.in'),
    ('PM Krishi Sinchai Yojana', 'Subsidy for drip and sprinkler irrigation systems.', 'Farmers with own or leased land', 'government', 'https://pmksy.gov.in'),
    ('Tractor Loan Scheme', 'Bank financing for tractors and farm machinery with flexible repayment.', 'Farmers with at least 2 acres of land', 'private', 'https://www.sbi.co.in'),
    ('Agri Gold Loan', 'Loans against gold ornaments for agricultural purposes.', 'Farmers with agricultural land records', 'private', 'https://www.hdfcbank.com');

-- ============================================================================
-- MARKET PRICES (Rs per quintal)
-- ============================================================================
INSERT OR IGNORE INTO market_prices (market, crop, variety, min_price, max_price, modal_price, price_date) VALUES
    ('Azadpur', 'Tomato', 'Hybrid', 800, 1600, 1200, '2024-01-15'),
    ('Azadpur', 'Onion', 'Red', 1500, 2400, 2000, '2024-01-15'),
    ('Azadpur', 'Potato', 'Jyoti', 900, 1300, 1100, '2024-01-15'),
    ('Indore', 'Soyabean', 'Yellow', 4300, 4700, 4550, '2024-01-15'),
    ('Indore', 'Wheat', 'Lokwan', 2400, 2900, 2650, '2024-01-15'),
    ('Indore', 'Gram', 'Desi', 5200, 5800, 5500, '2024-01-15'),
    ('Lasalgaon', 'Onion', 'Red', 1400, 2300, 1900, '2024-01-15'),
    ('Nagpur', 'Cotton', 'Medium Staple', 6600, 7100, 6900, '2024-01-15'),
    ('Nagpur', 'Orange', 'Nagpuri', 2500, 4000, 3200, '2024-01-15');
"#;
