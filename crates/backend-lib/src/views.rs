// ============================
// crates/backend-lib/src/views.rs
// ============================
//! HTML for the site pages.
//!
//! Every page shares one layout: navigation that reflects the logged-in
//! user, optional error/message flashes, then the page body. Anything that
//! came from a request is escaped before it lands in the markup.
use axum::response::Html;
use chrono::Datelike;
use serde::Deserialize;
use spice_common::BookingRequest;

use crate::middleware::Identity;

/// `?error=..&message=..` flashes carried across redirects
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// What every page needs besides its own content
#[derive(Debug, Default, Clone)]
pub struct PageContext {
    pub identity: Option<Identity>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl PageContext {
    pub fn new(identity: Option<Identity>, flash: Flash) -> Self {
        Self {
            identity,
            error: flash.error.filter(|e| !e.is_empty()),
            message: flash.message.filter(|m| !m.is_empty()),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// A dish on the menu
pub struct Dish {
    pub name: &'static str,
    pub price: f64,
    pub description: &'static str,
}

pub const MENU: &[Dish] = &[
    Dish {
        name: "Paneer Tikka",
        price: 240.0,
        description: "Cottage cheese marinated in spiced yoghurt, charred in the tandoor.",
    },
    Dish {
        name: "Chicken Biryani",
        price: 320.0,
        description: "Dum-cooked basmati rice layered with saffron and slow-braised chicken.",
    },
    Dish {
        name: "Dal Makhani",
        price: 210.0,
        description: "Black lentils simmered overnight with butter and cream.",
    },
    Dish {
        name: "Masala Dosa",
        price: 160.0,
        description: "Crisp rice crepe filled with spiced potato, served with chutneys.",
    },
    Dish {
        name: "Butter Naan",
        price: 60.0,
        description: "Leavened flatbread brushed with butter.",
    },
    Dish {
        name: "Gulab Jamun",
        price: 110.0,
        description: "Milk dumplings soaked in cardamom syrup.",
    },
    Dish {
        name: "Masala Chai",
        price: 50.0,
        description: "Strong tea brewed with ginger and whole spices.",
    },
];

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, ctx: &PageContext, body: &str) -> Html<String> {
    let account = match &ctx.identity {
        Some(identity) => format!(
            r#"<span class="user">Hello, {}</span> <a href="/logout">Logout</a>"#,
            escape(&identity.username)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };
    let mut flashes = String::new();
    if let Some(error) = &ctx.error {
        flashes.push_str(&format!(r#"<p class="flash error">{}</p>"#, escape(error)));
    }
    if let Some(message) = &ctx.message {
        flashes.push_str(&format!(r#"<p class="flash message">{}</p>"#, escape(message)));
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Spice Paradise</title>
<link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
<header>
<nav>
<a class="brand" href="/">Spice Paradise</a>
<a href="/menu">Menu</a> <a href="/booking">Book a Table</a> <a href="/contact">Contact</a> <a href="/cart">Cart</a>
<span class="account">{account}</span>
</nav>
</header>
<main>
{flashes}
{body}
</main>
<footer><p>&copy; {year} Spice Paradise. All rights reserved.</p></footer>
<script src="/static/js/cart.js"></script>
</body>
</html>
"#,
        title = escape(title),
        year = chrono::Utc::now().year(),
    ))
}

pub fn home(ctx: &PageContext) -> Html<String> {
    layout(
        "Home",
        ctx,
        r#"<section class="hero">
<h1>Welcome to Spice Paradise</h1>
<p>Authentic flavours, slow-cooked the way our grandmothers taught us.</p>
<a class="button" href="/menu">See the menu</a> <a class="button" href="/booking">Book a table</a>
</section>"#,
    )
}

pub fn menu(ctx: &PageContext) -> Html<String> {
    let items: String = MENU
        .iter()
        .map(|dish| {
            format!(
                r#"<li class="dish"><h3>{name}</h3><p>{description}</p><span class="price">&#8377;{price:.2}</span>
<button class="add-to-cart" data-name="{name}" data-price="{price:.2}">Add to cart</button></li>
"#,
                name = escape(dish.name),
                description = escape(dish.description),
                price = dish.price,
            )
        })
        .collect();
    layout("Menu", ctx, &format!("<h1>Our Menu</h1>\n<ul class=\"menu\">\n{items}</ul>"))
}

pub fn contact(ctx: &PageContext) -> Html<String> {
    layout(
        "Contact",
        ctx,
        r#"<h1>Contact Us</h1>
<p>14 Residency Road, Bengaluru</p>
<p>Phone: +91 80 4000 1234</p>
<p>Open daily 12:00 to 23:00</p>"#,
    )
}

pub fn booking(ctx: &PageContext, booking: Option<&BookingRequest>) -> Html<String> {
    let confirmation = booking
        .map(|b| {
            format!(
                r#"<section class="confirmation">
<p>Your table has been successfully booked! We look forward to your visit.</p>
<dl><dt>Name</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd><dt>Phone</dt><dd>{}</dd><dt>Date</dt><dd>{}</dd><dt>Time</dt><dd>{}</dd></dl>
</section>"#,
                escape(&b.name),
                escape(&b.email),
                escape(&b.phone),
                escape(&b.date),
                escape(&b.time)
            )
        })
        .unwrap_or_default();
    layout(
        "Book a Table",
        ctx,
        &format!(
            r#"<h1>Book a Table</h1>
{confirmation}
<form method="post" action="/booking">
<label>Name <input name="name" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Phone <input type="tel" name="phone" required></label>
<label>Date <input type="date" name="date" required></label>
<label>Time <input type="time" name="time" required></label>
<button type="submit">Book</button>
</form>"#
        ),
    )
}

pub fn cart(ctx: &PageContext) -> Html<String> {
    let checkout = if ctx.identity.is_some() {
        r#"<form id="checkout">
<label>Delivery address <textarea name="address" required></textarea></label>
<label>Tip <input type="number" name="tip" min="0" step="1" value="0"></label>
<button type="submit">Place order</button>
</form>"#
    } else {
        r#"<p class="notice">Please <a href="/login">login</a> to place your order.</p>"#
    };
    layout(
        "Cart",
        ctx,
        &format!(
            r#"<h1>Your Cart</h1>
<table id="cart-items"><thead><tr><th>Dish</th><th>Qty</th><th>Price</th></tr></thead><tbody></tbody></table>
<p>Subtotal: &#8377;<span id="cart-subtotal">0.00</span></p>
{checkout}"#
        ),
    )
}

fn credentials_form(action: &str, heading: &str, button: &str, footer: &str) -> String {
    format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">{button}</button>
</form>
<p>{footer}</p>"#
    )
}

pub fn login(ctx: &PageContext) -> Html<String> {
    layout(
        "Login",
        ctx,
        &credentials_form(
            "/login",
            "Login",
            "Login",
            r#"No account yet? <a href="/register">Register</a>"#,
        ),
    )
}

pub fn register(ctx: &PageContext) -> Html<String> {
    layout(
        "Register",
        ctx,
        &credentials_form(
            "/register",
            "Create an account",
            "Register",
            r#"Already registered? <a href="/login">Login</a>"#,
        ),
    )
}

pub fn not_found(ctx: &PageContext) -> Html<String> {
    layout(
        "Not Found",
        ctx,
        r#"<h1>Page not found</h1><p><a href="/">Back to the home page</a></p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_layout_reflects_identity() {
        let anonymous = home(&PageContext::default()).0;
        assert!(anonymous.contains(r#"href="/login""#));
        assert!(!anonymous.contains("Logout"));

        let ctx = PageContext {
            identity: Some(Identity {
                user_id: 1,
                username: "<alice>".to_string(),
            }),
            ..Default::default()
        };
        let page = home(&ctx).0;
        assert!(page.contains("Hello, &lt;alice&gt;"));
        assert!(page.contains("Logout"));
    }

    #[test]
    fn test_flashes_are_escaped() {
        let ctx = PageContext::new(
            None,
            Flash {
                error: Some("<b>bad</b>".to_string()),
                message: Some(String::new()),
            },
        );
        let page = login(&ctx).0;
        assert!(page.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(!page.contains(r#"class="flash message""#));
    }

    #[test]
    fn test_cart_requires_login_to_checkout() {
        let page = cart(&PageContext::default()).0;
        assert!(page.contains("to place your order"));
        assert!(!page.contains(r#"id="checkout""#));
    }
}
