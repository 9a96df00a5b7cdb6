use crate::config::ScanConfig;
use crate::repo::RepoMetadata;
use crate::report::{ComponentRecord, ScanReport};
use crate::scan::scan_source;

const PATH: &str = "src/App.tsx";

fn scan(source: &str) -> ScanReport {
    let config = ScanConfig {
        resolve_repository: false,
        ..ScanConfig::default()
    };
    scan_source(&config, PATH, source, RepoMetadata::placeholder()).unwrap()
}

fn id(name: &str) -> String {
    format!("{}:{}", PATH, name)
}

fn referenced_location(report: &ScanReport, name: &str) -> String {
    match report.components.get(&id(name)) {
        Some(ComponentRecord::Referenced(c)) => c.definition_location.clone(),
        other => panic!("{} is not referenced-only: {:?}", name, other),
    }
}

#[test]
fn test_exported_component_and_sibling() {
    let report = scan(
        "export function Hello() { return <Title/>; }\n\
         function Title() { return <h1/>; }\n",
    );

    assert_eq!(report.exports, vec![id("Hello")]);

    let hello = report.defined(&id("Hello")).expect("Hello is defined");
    assert_eq!(hello.referenced_components, vec![id("Title")]);
    assert_eq!(hello.exported_as.as_deref(), Some("Hello"));
    assert_eq!(hello.source_location.to_string(), "src/App.tsx#L1");

    // Referenced first, defined later in the file: the definition wins.
    let title = report.defined(&id("Title")).expect("Title is defined");
    assert_eq!(title.exported_as, None);
    assert!(title.referenced_components.is_empty());
}

#[test]
fn test_lowercase_tags_skipped_at_any_depth() {
    let report = scan(
        "export function Page() {\n\
           return <div><section><span><Card/></span></section></div>;\n\
         }\n",
    );

    let page = report.defined(&id("Page")).unwrap();
    assert_eq!(page.referenced_components, vec![id("Card")]);
    assert!(!report.components.keys().any(|k| k.ends_with(":div") || k.ends_with(":span")));
    assert_eq!(referenced_location(&report, "Card"), "?");
}

#[test]
fn test_references_deduplicated_in_order() {
    let report = scan("export function List() { return <><Item/><Divider/><Item/></>; }\n");
    let list = report.defined(&id("List")).unwrap();
    assert_eq!(list.referenced_components, vec![id("Item"), id("Divider")]);
}

#[test]
fn test_resolved_reference_location() {
    let report = scan(
        "import { Avatar } from \"./Avatar\";\n\
         export function Profile() { return <Avatar/>; }\n",
    );
    assert_eq!(referenced_location(&report, "Avatar"), "src/App.tsx#L1");
}

#[test]
fn test_arrow_component() {
    let report = scan(
        "/** Side panel. */\n\
         export const Panel = (props: { open: boolean }) => <Box/>;\n",
    );

    let panel = report.defined(&id("Panel")).expect("arrow component is defined");
    assert_eq!(panel.exported_as.as_deref(), Some("Panel"));
    assert_eq!(panel.referenced_components, vec![id("Box")]);
    assert_eq!(panel.meta.documentation, "Side panel.");
    assert_eq!(panel.meta.type_signature.as_deref(), Some("(props: { open: boolean })"));
}

#[test]
fn test_non_template_functions_ignored() {
    let report = scan(
        "export function add(a: number, b: number) { return a + b; }\n\
         const helper = () => 42;\n",
    );
    assert!(report.components.is_empty());
    assert!(report.exports.is_empty());
}

#[test]
fn test_nested_functions_are_not_components() {
    let report = scan(
        "function Outer() {\n\
           function Inner() { return <i/>; }\n\
           return null;\n\
         }\n",
    );
    assert!(report.components.get(&id("Inner")).is_none());
}

#[test]
fn test_default_export_function() {
    let report = scan("export default function Home() { return <main/>; }\n");
    let home = report.defined(&id("Home")).unwrap();
    assert_eq!(home.exported_as.as_deref(), Some("default"));
    assert_eq!(report.exports, vec![id("Home")]);
}

#[test]
fn test_export_aliases_applied_after_walk() {
    let report = scan(
        "export { Card as Tile };\n\
         function Card() { return <div/>; }\n\
         function Badge() { return <span/>; }\n\
         export default Badge;\n",
    );

    assert_eq!(report.defined(&id("Card")).unwrap().exported_as.as_deref(), Some("Tile"));
    assert_eq!(
        report.defined(&id("Badge")).unwrap().exported_as.as_deref(),
        Some("default")
    );
    assert_eq!(report.exports, vec![id("Card"), id("Badge")]);
}

#[test]
fn test_class_component_with_render_helpers() {
    let report = scan(
        "import React from \"react\";\n\
         export class Board extends React.Component<{}> {\n\
           renderRow() { return <Row/>; }\n\
           footer = () => <Footer/>;\n\
           count = 0;\n\
           render() { return <Grid/>; }\n\
         }\n",
    );

    let board = report.defined(&id("Board")).expect("class component is defined");
    assert_eq!(board.referenced_components, vec![id("Grid")]);
    assert_eq!(board.exported_as.as_deref(), Some("Board"));

    let row = report.defined(&id("Board.renderRow()")).expect("render helper");
    assert_eq!(row.name, "Board.renderRow");
    assert_eq!(row.referenced_components, vec![id("Row")]);

    let footer = report.defined(&id("Board.footer()")).expect("arrow field helper");
    assert_eq!(footer.referenced_components, vec![id("Footer")]);

    assert!(report.components.get(&id("Board.count()")).is_none());
    assert_eq!(report.exports, vec![id("Board")]);
}

#[test]
fn test_template_valued_field_is_helper() {
    let report = scan(
        "import { Component } from \"react\";\n\
         class Board extends Component {\n\
           icon = <Icon/>;\n\
           render() { return <div/>; }\n\
         }\n",
    );

    let icon = report.defined(&id("Board.icon()")).expect("template field helper");
    assert_eq!(icon.name, "Board.icon");
    assert_eq!(icon.referenced_components, vec![id("Icon")]);
}

#[test]
fn test_arrow_render_field_supplies_class_references() {
    let report = scan(
        "import { Component } from \"react\";\n\
         class Board extends Component {\n\
           render = () => <Grid/>;\n\
         }\n",
    );

    let board = report.defined(&id("Board")).unwrap();
    assert_eq!(board.referenced_components, vec![id("Grid")]);
    assert!(report.components.get(&id("Board.render()")).is_none());
}

#[test]
fn test_class_with_unknown_base_is_skipped() {
    let report = scan("class Store extends Base { render() { return <View/>; } }\n");
    assert!(report.components.is_empty());
}

#[test]
fn test_bare_component_base() {
    let report = scan(
        "import { PureComponent } from \"react\";\n\
         class Clock extends PureComponent { render() { return <time/>; } }\n",
    );
    assert!(report.defined(&id("Clock")).is_some());
}

#[test]
fn test_lazy_components() {
    let report = scan(
        "import React, { lazy } from \"react\";\n\
         const Settings = lazy(() => import(\"./pages/Settings\"));\n\
         const Billing = React.lazy(() => import(\"./pages/Billing\"));\n\
         export function App() { return <Settings/>; }\n",
    );

    assert_eq!(referenced_location(&report, "Settings"), "./pages/Settings");
    assert_eq!(referenced_location(&report, "Billing"), "./pages/Billing");
    assert_eq!(
        report.defined(&id("App")).unwrap().referenced_components,
        vec![id("Settings")]
    );
}

#[test]
fn test_dynamic_import_without_wrapper() {
    let report = scan("const mod = load(() => import(\"./x\"));\n");
    assert!(report.components.is_empty());
}

#[test]
fn test_component_attribute_adds_edge() {
    let report = scan(
        "export function Routes() { return <Route path=\"/\" component={Home}/>; }\n\
         function Home() { return <main/>; }\n",
    );
    let routes = report.defined(&id("Routes")).unwrap();
    assert_eq!(routes.referenced_components, vec![id("Route"), id("Home")]);
    assert!(report.defined(&id("Home")).is_some());
}

#[test]
fn test_member_tag_identity() {
    let report = scan(
        "import * as UI from \"./ui\";\n\
         export function Toolbar() { return <UI.Button/>; }\n",
    );
    let toolbar = report.defined(&id("Toolbar")).unwrap();
    assert_eq!(toolbar.referenced_components, vec![id("UI.Button")]);
    assert_eq!(referenced_location(&report, "UI.Button"), "src/App.tsx#L1");
}

#[test]
fn test_later_reference_keeps_definition() {
    let report = scan(
        "export function Card() { return <div/>; }\n\
         export function Card2() { return <Card/>; }\n",
    );
    let card = report.defined(&id("Card")).unwrap();
    assert_eq!(card.source_location.to_string(), "src/App.tsx#L1");
    assert_eq!(report.exports, vec![id("Card"), id("Card2")]);
}
