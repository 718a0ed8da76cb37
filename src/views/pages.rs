//! One renderer per page

use std::fmt::Write;

use super::{error_block, escape_html, layout};
use crate::catalog::animal_facts;
use crate::catalog::compliments::MAX_COMPLIMENTS;
use crate::gif_search::{GifResult, MAX_GIFS};
use crate::imaging::FilterKind;

pub fn home() -> String {
    layout(
        "Form Playground",
        r#"    <p>Pick something to try:</p>
    <ul>
        <li><a href="/compliments">Get some compliments</a></li>
        <li><a href="/animal_facts">Learn an animal fact</a></li>
        <li><a href="/image_filter">Filter an image</a></li>
        <li><a href="/gif_search">Search for GIFs</a></li>
    </ul>
"#,
    )
}

pub fn compliments_form(error: Option<&str>) -> String {
    let content = format!(
        r#"{error}    <form action="/compliments_results" method="GET">
        <label for="users_name">What is your name?</label>
        <input type="text" id="users_name" name="users_name">
        <label>
            <input type="checkbox" name="wants_compliments" value="on">
            I would like some compliments
        </label>
        <label for="num_compliments">How many? (1-{max})</label>
        <input type="number" id="num_compliments" name="num_compliments" min="1" max="{max}" value="1">
        <p><input type="submit" value="Submit"></p>
    </form>
"#,
        error = error_block(error),
        max = MAX_COMPLIMENTS,
    );
    layout("Compliments", &content)
}

pub fn compliments_results(
    users_name: Option<&str>,
    wants_compliments: bool,
    compliments: &[&str],
) -> String {
    let mut content = String::new();
    let name = users_name.filter(|n| !n.trim().is_empty()).unwrap_or("friend");
    let _ = writeln!(content, "    <p>Hello, {}!</p>", escape_html(name));

    if wants_compliments {
        content.push_str("    <p>You are:</p>\n    <ul>\n");
        for compliment in compliments {
            let _ = writeln!(content, "        <li>{}</li>", escape_html(compliment));
        }
        content.push_str("    </ul>\n");
    } else {
        content.push_str("    <p>No compliments for you, as requested.</p>\n");
    }
    content.push_str("    <p><a href=\"/compliments\">Try again</a></p>\n");

    layout("Compliments", &content)
}

pub fn animal_facts(chosen: Option<&str>, fact: Option<&str>) -> String {
    let mut options = String::new();
    for animal in animal_facts::animals() {
        let selected = if chosen == Some(animal) { " selected" } else { "" };
        let escaped = escape_html(animal);
        let _ = writeln!(
            options,
            "            <option value=\"{escaped}\"{selected}>{escaped}</option>"
        );
    }

    let mut content = format!(
        r#"    <form action="/animal_facts" method="GET">
        <label for="animal">Choose an animal</label>
        <select id="animal" name="animal">
{options}        </select>
        <input type="submit" value="Tell me a fact">
    </form>
"#
    );

    match (chosen, fact) {
        (Some(animal), Some(fact)) => {
            let _ = writeln!(
                content,
                "    <h2>{}</h2>\n    <p>{}</p>",
                escape_html(animal),
                escape_html(fact)
            );
        }
        (Some(animal), None) if !animal.is_empty() => {
            let _ = writeln!(
                content,
                "    <p>No fact known about {}.</p>",
                escape_html(animal)
            );
        }
        _ => {}
    }

    layout("Animal Facts", &content)
}

/// Upload form, plus the filtered result or an error
pub fn image_filter(image_url: Option<&str>, error: Option<&str>) -> String {
    let mut options = String::new();
    for filter in FilterKind::ALL {
        let _ = writeln!(
            options,
            "            <option value=\"{name}\">{name}</option>",
            name = filter.name()
        );
    }

    let mut content = format!(
        r#"{error}    <form action="/image_filter" method="POST" enctype="multipart/form-data">
        <label for="users_image">Choose an image</label>
        <input type="file" id="users_image" name="users_image" accept="image/*">
        <label for="filter_type">Filter</label>
        <select id="filter_type" name="filter_type">
{options}        </select>
        <p><input type="submit" value="Apply filter"></p>
    </form>
"#,
        error = error_block(error),
    );

    if let Some(url) = image_url {
        let url = escape_html(url);
        let _ = writeln!(
            content,
            "    <h2>Your filtered image</h2>\n    <p><a href=\"{url}\"><img src=\"{url}\" alt=\"filtered image\"></a></p>"
        );
    }

    layout("Image Filter", &content)
}

/// State of the GIF search page
#[derive(Debug, Default)]
pub struct GifSearchView<'a> {
    pub query: &'a str,
    pub gifs: &'a [GifResult],
    pub message: Option<&'a str>,
}

pub fn gif_search(view: &GifSearchView<'_>) -> String {
    let mut content = format!(
        r#"{message}    <form action="/gif_search" method="POST">
        <label for="search_query">Search for</label>
        <input type="text" id="search_query" name="search_query" value="{query}">
        <label for="quantity">How many? (1-{max})</label>
        <input type="number" id="quantity" name="quantity" min="1" max="{max}" value="{max}">
        <p><input type="submit" value="Search"></p>
    </form>
"#,
        message = error_block(view.message),
        query = escape_html(view.query),
        max = MAX_GIFS,
    );

    if !view.gifs.is_empty() {
        content.push_str("    <div class=\"gifs\">\n");
        for gif in view.gifs {
            let Some(src) = gif.preview_url() else {
                continue;
            };
            let _ = writeln!(
                content,
                "        <a href=\"{href}\"><img src=\"{src}\" alt=\"{alt}\"></a>",
                href = escape_html(&gif.itemurl),
                src = escape_html(src),
                alt = escape_html(&gif.content_description),
            );
        }
        content.push_str("    </div>\n");
    }

    layout("GIF Search", &content)
}
