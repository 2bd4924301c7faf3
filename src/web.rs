//! Browser embedding: canvas animation loop and DOM wiring.
//!
//! Expected page elements: a `#laser-bg` canvas, `[data-cmd]` formula
//! buttons, a `#formArea` container, `#customExpr` / `#customVars` inputs,
//! `#evalCustom` / `#clearCustom` buttons, and `#result` / `#history`
//! output areas.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, HtmlTextAreaElement, Window,
};

use crate::config::{ParticleConfig, WidgetConfig};
use crate::formulas::{FormInput, Formula};
use crate::particles::{Hsla, ParticleField, Surface};
use crate::widget::Calculator;

const CANVAS_ID: &str = "laser-bg";
const FORM_AREA_ID: &str = "formArea";
const FORM_BUTTON_ID: &str = "calcFormula";
const RESULT_ID: &str = "result";
const HISTORY_ID: &str = "history";
const EXPR_ID: &str = "customExpr";
const VARS_ID: &str = "customVars";
const EVAL_ID: &str = "evalCustom";
const CLEAR_ID: &str = "clearCustom";

/// [`Surface`] backed by a 2D canvas context
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        CanvasSurface { ctx }
    }
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, width, height);
    }

    fn draw_point(&mut self, x: f64, y: f64, radius: f64, color: Hsla) {
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.arc(x, y, radius, 0.0, TAU).ok();
        self.ctx.fill();
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Hsla) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let cfg = WidgetConfig::default();

    start_animation(&window, &document, &cfg.particles)?;
    wire_calculator(&document, &cfg)?;
    log::info!("calculator widget started");
    Ok(())
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no #{}", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{} has an unexpected type", id)))
}

fn viewport(window: &Window) -> (f64, f64) {
    let size = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (size(window.inner_width()), size(window.inner_height()))
}

fn request_animation_frame(window: &Window, f: &Closure<dyn FnMut()>) {
    if let Err(e) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {:?}", e);
    }
}

fn on_click<F: FnMut() + 'static>(target: &EventTarget, f: F) -> Result<(), JsValue> {
    let cb = Closure::<dyn FnMut()>::new(f);
    target.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn start_animation(window: &Window, document: &Document, cfg: &ParticleConfig) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = element(document, CANVAS_ID)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;

    let (w, h) = viewport(window);
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);

    let mut rng = SmallRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64);
    let field = Rc::new(RefCell::new(ParticleField::new(w, h, cfg, &mut rng)));

    // resizing resets the canvas coordinate space but keeps the particles
    let resize_field = field.clone();
    let resize_window = window.clone();
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        let (w, h) = viewport(&resize_window);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        resize_field.borrow_mut().resize(w, h);
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    let mut surface = CanvasSurface::new(ctx);
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let frame_window = window.clone();
    *g.borrow_mut() = Some(Closure::new(move || {
        field.borrow_mut().frame(&mut surface);
        if let Some(cb) = f.borrow().as_ref() {
            request_animation_frame(&frame_window, cb);
        }
    }));
    if let Some(cb) = g.borrow().as_ref() {
        request_animation_frame(window, cb);
    }
    Ok(())
}

struct Ui {
    document: Document,
    calc: Calculator,
    formula: Formula,
}

impl Ui {
    /// Writes each line of `text` as its own block so multi-line results
    /// (quadratic roots) keep their line breaks
    fn show_result(&self, text: &str) {
        let Some(el) = self.document.get_element_by_id(RESULT_ID) else {
            return;
        };
        el.set_text_content(None);
        for line in result_lines(text) {
            let appended = self.document.create_element("div").and_then(|row| {
                row.set_text_content(Some(line));
                el.append_child(&row)
            });
            if let Err(e) = appended {
                log::error!("failed to show result: {:?}", e);
                el.set_text_content(Some(text));
                return;
            }
        }
    }

    fn show_history(&self) {
        if let Some(el) = self.document.get_element_by_id(HISTORY_ID) {
            el.set_inner_html(&self.calc.history().render_html());
        }
    }

    fn field_value(&self, id: &str) -> String {
        let Some(el) = self.document.get_element_by_id(id) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn clear_field(&self, id: &str) {
        let Some(el) = self.document.get_element_by_id(id) else {
            return;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value("");
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value("");
        }
    }

    /// Rebuilds the form area for the selected formula
    fn select_formula(&mut self, formula: Formula) -> Result<(), JsValue> {
        self.formula = formula;
        let area: HtmlElement = element(&self.document, FORM_AREA_ID)?;
        area.set_inner_html("");

        let hint = self.document.create_element("div")?;
        hint.set_class_name("muted");
        hint.set_text_content(Some(formula.hint()));
        area.append_child(&hint)?;

        for field in formula.fields() {
            let input = self.document.create_element("input")?.dyn_into::<HtmlInputElement>()?;
            input.set_id(field.id);
            input.set_placeholder(field.placeholder);
            area.append_child(&input)?;
        }

        let row = self.document.create_element("div")?;
        row.set_class_name("row");
        let button = self.document.create_element("button")?;
        button.set_id(FORM_BUTTON_ID);
        button.set_text_content(Some("Calculate"));
        row.append_child(&button)?;
        area.append_child(&row)?;
        Ok(())
    }

    fn run_formula(&mut self) {
        let formula = self.formula;
        let mut input = FormInput::new();
        for field in formula.fields() {
            input.set(field.id, &self.field_value(field.id));
        }
        match self.calc.run_formula(formula, &input) {
            Ok(text) => {
                self.show_result(&text);
                self.show_history();
            }
            Err(e) => self.show_result(&e.to_string()),
        }
    }

    fn eval_custom(&mut self) {
        let expr = self.field_value(EXPR_ID);
        let vars = self.field_value(VARS_ID);
        match self.calc.eval_custom(&expr, &vars) {
            Ok(text) => {
                self.show_result(&text);
                self.show_history();
            }
            Err(e) => self.show_result(&e.to_string()),
        }
    }

    fn clear_custom(&self) {
        self.clear_field(EXPR_ID);
        self.clear_field(VARS_ID);
        self.show_result(self.calc.clear_custom());
    }
}

fn result_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.is_empty())
}

fn wire_calculator(document: &Document, cfg: &WidgetConfig) -> Result<(), JsValue> {
    let ui = Rc::new(RefCell::new(Ui {
        document: document.clone(),
        calc: Calculator::with_config(cfg),
        formula: Formula::RectangleArea,
    }));

    let buttons = document.query_selector_all("[data-cmd]")?;
    for i in 0..buttons.length() {
        let Some(el) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let cmd = el.get_attribute("data-cmd").unwrap_or_default();
        let Some(formula) = Formula::from_command(&cmd) else {
            log::warn!("unknown formula command '{}'", cmd);
            continue;
        };
        let ui = ui.clone();
        on_click(&el, move || {
            if let Err(e) = ui.borrow_mut().select_formula(formula) {
                log::error!("failed to build form: {:?}", e);
            }
        })?;
    }

    // the form button is recreated on every selection, so clicks are
    // handled once on the container
    let form_area: HtmlElement = element(document, FORM_AREA_ID)?;
    let form_ui = ui.clone();
    let on_form_click = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
        let is_button = e
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| el.id() == FORM_BUTTON_ID)
            .unwrap_or(false);
        if is_button {
            form_ui.borrow_mut().run_formula();
        }
    });
    form_area.add_event_listener_with_callback("click", on_form_click.as_ref().unchecked_ref())?;
    on_form_click.forget();

    let eval_button: HtmlElement = element(document, EVAL_ID)?;
    let eval_ui = ui.clone();
    on_click(&eval_button, move || eval_ui.borrow_mut().eval_custom())?;

    let clear_button: HtmlElement = element(document, CLEAR_ID)?;
    let clear_ui = ui.clone();
    on_click(&clear_button, move || clear_ui.borrow().clear_custom())?;

    ui.borrow_mut().select_formula(Formula::RectangleArea)
}
