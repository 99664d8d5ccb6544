//! Sample letter documents for testing and demonstration.
//!
//! Each sample is a complete JSON request as the business layer would send
//! it: every string pre-formatted, amounts already computed.

/// An invoice with a position table, tax summary and a three-column footer.
pub fn invoice_template() -> &'static str {
    r##"{
    "senderLines": ["Acme GmbH - Musterweg 12, DE 12345 Berlin"],
    "receiverLines": [
        "Beispiel AG",
        "Erika Musterfrau",
        "Heidestraße 17",
        "51147 Köln"
    ],
    "meta": [
        { "label": "Kundennummer:", "value": "KD-10023" },
        { "label": "Rechnungsnummer:", "value": "RE-2024-0117" },
        { "label": "Datum:", "value": "12.03.2024" }
    ],
    "body": {
        "headline": "Rechnung",
        "reference": "RE-2024-0117",
        "opening": "Sehr geehrte Frau Musterfrau,\nwir erlauben uns, Ihnen folgende Leistungen in Rechnung zu stellen:",
        "note": "Leistungszeitraum 01.02.2024 - 29.02.2024",
        "table": {
            "header": ["Pos", "Anzahl", "Preis", "Beschreibung", "USt", "Netto"],
            "columnPercents": [6, 10, 10, 54, 8, 12],
            "columnAligns": ["LM", "LM", "LM", "LM", "RM", "RM"],
            "rows": [
                ["1", "40 Std", "85,00€", "Softwareentwicklung", "19%", "3.400,00€"],
                ["2", "1 Pau", "250,00€", "Projektkoordination,\nAbstimmung mit Fachabteilung", "19%", "250,00€"],
                ["3", "12 Mon", "41,67€", "Hosting (Jahrespaket)", "19%", "500,04€"]
            ],
            "summary": [
                { "label": "Zwischensumme", "value": "4.150,04€" },
                { "label": "19%", "value": "788,51€" },
                { "label": "Gesamtbetrag", "value": "4.938,55€" }
            ]
        },
        "closing": [
            "Bitte überweisen Sie den Rechnungsbetrag innerhalb von 14 Tagen auf das unten genannte Konto.",
            "Mit freundlichen Grüßen\nAcme GmbH"
        ]
    },
    "footer": {
        "left": ["www.acme.example", "+49 30 1234567", "rechnung@acme.example"],
        "center": ["Acme GmbH", "Musterweg 12", "12345 Berlin", "USt-IdNr. DE123456789"],
        "right": ["Berliner Bank", "DE02 1203 0000 0000 2020 51", "BYLADEM1001"]
    }
}"##
}

/// A delivery note: same letter, no prices and no summary band.
pub fn delivery_note_template() -> &'static str {
    r##"{
    "senderLines": ["Acme GmbH - Musterweg 12, DE 12345 Berlin"],
    "receiverLines": [
        "Beispiel AG",
        "Wareneingang",
        "Heidestraße 17",
        "51147 Köln"
    ],
    "meta": [
        { "label": "Kundennummer:", "value": "KD-10023" },
        { "label": "Liefernummer:", "value": "LS-2024-0049" },
        { "label": "Datum:", "value": "14.03.2024" }
    ],
    "body": {
        "headline": "Lieferschein",
        "reference": "LS-2024-0049",
        "opening": "Sehr geehrte Damen und Herren,\nwir liefern Ihnen wie vereinbart:",
        "table": {
            "header": ["Pos", "Anzahl", "Beschreibung", "Notiz"],
            "columnPercents": [7, 18, 40, 35],
            "columnAligns": ["LM", "LM", "LM", "LM"],
            "rows": [
                ["1", "2 Paletten", "Kartonagen 400×300×200", ""],
                ["2", "1 Paket", "Ersatzteile Serie C,\neinzeln verpackt", ""]
            ]
        },
        "closing": [
            "Bitte prüfen Sie die Ware bei Erhalt auf Vollständigkeit.",
            "Mit freundlichen Grüßen\nAcme GmbH"
        ]
    },
    "footer": {
        "left": ["www.acme.example"],
        "center": ["+49 30 1234567"],
        "right": ["versand@acme.example"]
    }
}"##
}

/// A tabular attachment: headline and a wide table, no address zones'
/// content beyond the receiver, prefix on the page numbers.
pub fn table_attachment_template() -> &'static str {
    r##"{
    "receiverLines": ["Beispiel AG", "Heidestraße 17", "51147 Köln"],
    "body": {
        "headline": "Stundennachweis",
        "note": "Februar 2024",
        "table": {
            "header": ["Datum", "Tätigkeit", "Stunden"],
            "columnPercents": [20, 60, 20],
            "columnAligns": ["LM", "LM", "RM"],
            "rows": [
                ["01.02.2024", "Implementierung Schnittstelle", "8,0"],
                ["02.02.2024", "Code-Review,\nFehleranalyse", "6,5"],
                ["05.02.2024", "Abstimmung mit Fachabteilung", "2,0"]
            ]
        }
    },
    "footer": {},
    "pageNumberPrefix": "Anlage 1 - "
}"##
}
