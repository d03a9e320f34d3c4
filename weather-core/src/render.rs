//! HTML pages for the web front end.
//!
//! Every page is a pure function of its input, so identical reports render
//! byte-identical pages.

use crate::{
    error::WeatherError,
    model::{Units, WeatherReport},
};

pub const STYLESHEET: &str = r#"
* { box-sizing: border-box; }
body { font-family: system-ui, sans-serif; background: #eef3f8; color: #1d2a35; margin: 0; }
main { max-width: 44rem; margin: 2rem auto; padding: 0 1rem; }
h1 { font-size: 1.6rem; margin-bottom: 1rem; }
form.search { display: flex; flex-wrap: wrap; gap: .5rem; margin-bottom: 1.5rem; }
form.search input, form.search select, form.search button { padding: .5rem .7rem; font-size: 1rem; }
form.search input[name=city] { flex: 1 1 12rem; }
form.search input[name=lat], form.search input[name=lon] { width: 7rem; }
.card { background: #fff; border-radius: .6rem; padding: 1.2rem 1.5rem; box-shadow: 0 1px 4px rgba(0,0,0,.08); }
.condition { text-transform: capitalize; font-size: 1.1rem; margin-top: 0; }
dl.current { display: grid; grid-template-columns: max-content 1fr; gap: .3rem 1.2rem; }
dl.current dt { font-weight: 600; }
ol.forecast { list-style: none; padding: 0; display: grid; grid-template-columns: repeat(auto-fill, minmax(8rem, 1fr)); gap: .6rem; }
li.forecast-day { background: #f6f9fc; border-radius: .4rem; padding: .6rem; text-align: center; }
.alert { padding: .8rem 1rem; border-radius: .4rem; margin-bottom: 1rem; }
.alert-error { background: #fde8e8; color: #8a1c1c; }
.observed { color: #5b6b78; font-size: .85rem; }
"#;

pub fn index_page() -> String {
    layout("Weather", &search_form(Units::default()))
}

pub fn report_page(report: &WeatherReport) -> String {
    let temp = report.units.temperature_symbol();
    let wind = report.units.wind_speed_symbol();

    let mut body = search_form(report.units);
    body.push_str("<section class=\"card report\">\n");
    body.push_str(&format!("<h2>{}</h2>\n", escape_html(&report.location_name)));
    body.push_str(&format!(
        "<p class=\"condition\">{}</p>\n",
        escape_html(&report.condition)
    ));

    // f64 `Display` is the shortest round-trip form, so values are unrounded.
    body.push_str(&format!(
        "<dl class=\"current\">\n\
         <dt>Temperature</dt><dd class=\"temperature\">{}{temp}</dd>\n\
         <dt>Feels like</dt><dd class=\"feels-like\">{}{temp}</dd>\n\
         <dt>Humidity</dt><dd class=\"humidity\">{}%</dd>\n\
         <dt>Wind</dt><dd class=\"wind\">{} {wind}</dd>\n\
         </dl>\n",
        report.temperature, report.feels_like, report.humidity_pct, report.wind_speed,
    ));
    body.push_str(&format!(
        "<p class=\"observed\">Observed {} local time</p>\n",
        report.observed_at.format("%Y-%m-%d %H:%M:%S")
    ));

    body.push_str("<h3>Forecast</h3>\n");
    if report.forecast.is_empty() {
        body.push_str("<p class=\"no-forecast\">No forecast available.</p>\n");
    } else {
        body.push_str("<ol class=\"forecast\">\n");
        for day in &report.forecast {
            body.push_str(&format!(
                "<li class=\"forecast-day\"><span class=\"date\">{}</span><br>\
                 <span class=\"range\">{}{temp} / {}{temp}</span><br>\
                 <span class=\"condition\">{}</span><br>\
                 <span class=\"humidity\">{}%</span></li>\n",
                day.date.format("%a %d %b"),
                day.temp_min,
                day.temp_max,
                escape_html(&day.condition),
                day.humidity_pct,
            ));
        }
        body.push_str("</ol>\n");
    }
    body.push_str("</section>\n");

    layout(&format!("Weather in {}", report.location_name), &body)
}

/// Error page. Shows the user-facing message only.
pub fn error_page(error: &WeatherError) -> String {
    let mut body = format!(
        "<div class=\"alert alert-error\" role=\"alert\">{}</div>\n",
        escape_html(&error.user_message())
    );
    body.push_str(&search_form(Units::default()));
    layout("Weather", &body)
}

fn search_form(selected: Units) -> String {
    let options: String = Units::all()
        .iter()
        .map(|units| {
            format!(
                "<option value=\"{0}\"{1}>{0}</option>",
                units.as_str(),
                if *units == selected { " selected" } else { "" }
            )
        })
        .collect();

    format!(
        "<form class=\"search\" method=\"post\" action=\"/weather\">\n\
         <input type=\"text\" name=\"city\" placeholder=\"City, e.g. London\">\n\
         <input type=\"text\" name=\"lat\" placeholder=\"Latitude\">\n\
         <input type=\"text\" name=\"lon\" placeholder=\"Longitude\">\n\
         <select name=\"units\">{options}</select>\n\
         <button type=\"submit\">Get weather</button>\n\
         </form>\n"
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n\
         <body>\n\
         <main>\n\
         <h1>Weather</h1>\n\
         {body}\
         </main>\n\
         </body>\n\
         </html>\n",
        escape_html(title)
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
