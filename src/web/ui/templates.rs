use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "map.html")]
pub struct MapTemplate {
    pub latitude: f64,
    pub longitude: f64,
    pub refresh_interval_ms: u64,
}
