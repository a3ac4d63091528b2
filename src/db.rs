use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::file("website/db/newsdesk.db");
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    Ok(pool)
}

/// Creates the modern schema only. Legacy CMS tables (wpj8_* and the wp_/wpj8_
/// taxonomy tables) are never created here — they may pre-exist in a database
/// imported from the old site, and the content resolver detects them at runtime.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- News articles (modern schema)
        CREATE TABLE IF NOT EXISTS news (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'Uncategorized',
            image TEXT,
            published INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_news_published_date ON news(published, created_at);
        CREATE INDEX IF NOT EXISTS idx_news_category ON news(category);

        -- Admin users
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Roles, assigned many-to-many
        CREATE TABLE IF NOT EXISTS roles (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_roles (
            user_id INTEGER NOT NULL,
            role_id INTEGER NOT NULL,
            UNIQUE(user_id, role_id),
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (role_id) REFERENCES roles(id)
        );

        -- Admin sessions
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at DATETIME NOT NULL,
            expires_at DATETIME NOT NULL,
            ip_address TEXT,
            user_agent TEXT,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        // General
        ("site_name", "Bangla Darpan"),
        ("site_url", "http://localhost:8000"),
        ("posts_per_page", "20"),
        ("default_category", "Uncategorized"),
        // Security
        ("session_expiry_hours", "24"),
        ("login_rate_limit", "5"),
        // Uploads
        ("uploads_max_mb", "10"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    for role in ["admin", "editor"] {
        conn.execute(
            "INSERT OR IGNORE INTO roles (name) VALUES (?1)",
            params![role],
        )?;
    }

    // Seed default admin if no users exist.
    // Default password: "admin123" — user MUST change after first login.
    let user_count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

    if user_count == 0 {
        let hash = bcrypt::hash("admin123", bcrypt::DEFAULT_COST)
            .map_err(|e| format!("Failed to hash default password: {}", e))?;
        conn.execute(
            "INSERT INTO users (email, password_hash, full_name) VALUES (?1, ?2, ?3)",
            params!["admin@bangladarpan.com", hash, "Admin"],
        )?;
        let user_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role_id)
             SELECT ?1, id FROM roles WHERE name = 'admin'",
            params![user_id],
        )?;
    }

    Ok(())
}
